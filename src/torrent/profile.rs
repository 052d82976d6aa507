/// How much of a document is interpreted when it is loaded.
///
/// The three predefined profiles trade validation for speed:
///
/// | profile | `info` | unknown keys | reads |
/// |---|---|---|---|
/// | [`Profile::STRICT`] | fully validated | classified, dropped or kept | whole file |
/// | [`Profile::ANNOUNCE_INFO`] | raw span only | kept verbatim | whole file |
/// | [`Profile::ANNOUNCE_ONLY`] | not read | kept verbatim | up to `announce-list` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Parse and check the layout of the `info` dictionary.
    pub validate_info: bool,
    /// Keep every other top level entry verbatim instead of running it
    /// through the meta key classifier.
    pub preserve_unknown_keys: bool,
    /// Stop after `announce-list` and keep the rest of the input as is.
    pub stop_after_announce_list: bool,
}

impl Profile {
    /// Full validation, used to sanitize documents.
    pub const STRICT: Profile = Profile {
        validate_info: true,
        preserve_unknown_keys: false,
        stop_after_announce_list: false,
    };

    /// Announce URLs and the info-hash; everything else is carried over.
    pub const ANNOUNCE_INFO: Profile = Profile {
        validate_info: false,
        preserve_unknown_keys: true,
        stop_after_announce_list: false,
    };

    /// Announce URLs only.
    pub const ANNOUNCE_ONLY: Profile = Profile {
        validate_info: false,
        preserve_unknown_keys: true,
        stop_after_announce_list: true,
    };

    /// Whether the entries after `announce` are walked with seeks instead of
    /// one by one.
    pub(crate) fn seeks(&self) -> bool {
        self.preserve_unknown_keys || self.stop_after_announce_list
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::STRICT
    }
}
