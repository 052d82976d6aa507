use crate::encoding::Encoder;

/// An object that can be encoded into a single bencode value
pub trait ToBencode {
    /// Encode this object into the bencode stream
    fn encode(&self, encoder: &mut Encoder);

    /// Encode this object to a byte string
    fn to_bencode(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        self.encode(&mut encoder);
        encoder.get_output()
    }
}

// Forwarding impls
impl<E: ToBencode + ?Sized> ToBencode for &E {
    fn encode(&self, encoder: &mut Encoder) {
        E::encode(self, encoder)
    }
}

// Base type impls
impl ToBencode for str {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.emit_str(self)
    }
}

impl ToBencode for String {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.emit_str(self)
    }
}

macro_rules! impl_encodable_integer {
    ($($type:ty)*) => {$(
        impl ToBencode for $type {
            fn encode(&self, encoder: &mut Encoder) {
                encoder.emit_int(i64::from(*self))
            }
        }
    )*}
}

impl_encodable_integer!(u8 u16 u32 i8 i16 i32 i64);

impl<ContentT: ToBencode> ToBencode for [ContentT] {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.emit_list(|e| {
            for item in self {
                e.emit(item);
            }
        })
    }
}

impl<ContentT: ToBencode> ToBencode for Vec<ContentT> {
    fn encode(&self, encoder: &mut Encoder) {
        self.as_slice().encode(encoder)
    }
}
