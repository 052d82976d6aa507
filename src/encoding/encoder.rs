use crate::encoding::ToBencode;

/// Accumulates bencode output in memory.
///
/// Unlike the decoder this is not zero-copy: the output is assembled from
/// fresh encodings and slices of the source document.
#[derive(Default, Debug)]
pub struct Encoder {
    output: Vec<u8>,
}

impl Encoder {
    /// Create a new, empty encoder
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Emit an arbitrary encodable object
    pub fn emit<E: ToBencode + ?Sized>(&mut self, value: &E) {
        value.encode(self);
    }

    /// Emit a byte string
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes.len().to_string().as_bytes());
        self.output.push(b':');
        self.output.extend_from_slice(bytes);
    }

    /// Emit a string
    pub fn emit_str(&mut self, value: &str) {
        self.emit_bytes(value.as_bytes());
    }

    /// Emit an integer. Torrent integers are signed 64 bit.
    pub fn emit_int(&mut self, value: i64) {
        self.output.push(b'i');
        self.output.extend_from_slice(value.to_string().as_bytes());
        self.output.push(b'e');
    }

    /// Emit a list whose items are written by `content_cb`
    pub fn emit_list<F>(&mut self, content_cb: F)
    where
        F: FnOnce(&mut Encoder),
    {
        self.output.push(b'l');
        content_cb(self);
        self.output.push(b'e');
    }

    /// Emit a dictionary entry. Keeping the keys of the enclosing dictionary
    /// sorted is up to the caller.
    pub fn emit_pair<E: ToBencode + ?Sized>(&mut self, key: &str, value: &E) {
        self.emit_str(key);
        self.emit(value);
    }

    /// Copy already encoded bytes to the output unchanged
    pub fn emit_raw(&mut self, raw: &[u8]) {
        self.output.extend_from_slice(raw);
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Return the encoded bytes
    pub fn get_output(self) -> Vec<u8> {
        self.output
    }
}
