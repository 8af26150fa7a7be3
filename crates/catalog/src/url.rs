//! Download URLs, bit-exact with the storage host's conventions.

/// Default storage host for attachments and attachment archives.
pub const DEFAULT_BASE_URL: &str = "https://storage.animetosho.org";

/// Builds download URLs under a single base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urls {
    base: String,
}
impl Urls {
    /// A trailing slash on `base` is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// A single attachment, addressed by its zero-padded hex id.
    ///
    /// ```
    /// use subcat_catalog::Urls;
    /// let urls = Urls::default();
    /// assert_eq!(urls.attachment(0xa6a3), "https://storage.animetosho.org/attach/0000a6a3/file.xz");
    /// ```
    pub fn attachment(&self, attachment_ref: u64) -> String {
        format!("{}/attach/{attachment_ref:08x}/file.xz", self.base)
    }

    /// Every attachment of a torrent, as one archive.
    ///
    /// ```
    /// use subcat_catalog::Urls;
    /// let urls = Urls::default();
    /// assert_eq!(
    ///     urls.complete_pack(123, "[Group] Show (BD 1080p)"),
    ///     "https://storage.animetosho.org/torattachpk/123/Group.Show.BD.1080p_attachments.7z"
    /// );
    /// ```
    pub fn complete_pack(&self, torrent_id: u64, name: &str) -> String {
        format!("{}/torattachpk/{torrent_id}/{}_attachments.7z", self.base, urlencoding::encode(&slug(name)))
    }

    /// Every attachment of a single file, as one archive.
    pub fn episode_pack(&self, file_id: u64, filename: &str) -> String {
        format!("{}/attachpk/{file_id}/{}_attachments.7z", self.base, urlencoding::encode(&slug(filename)))
    }
}
impl Default for Urls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Filesystem-safe archive name: brackets and parentheses removed, anything
/// other than letters, digits, `.`, `-`, `_` and spaces dropped, and runs of
/// whitespace joined with a single `.`.
pub fn slug(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0xa6a3, "https://storage.animetosho.org/attach/0000a6a3/file.xz")]
    #[case(0, "https://storage.animetosho.org/attach/00000000/file.xz")]
    #[case(0xdeadbeef, "https://storage.animetosho.org/attach/deadbeef/file.xz")]
    #[case(0x1_0000_0000, "https://storage.animetosho.org/attach/100000000/file.xz")]
    fn test_attachment(#[case] attachment_ref: u64, #[case] expected: &str) {
        assert_eq!(Urls::default().attachment(attachment_ref), expected);
    }

    #[rstest]
    #[case("[SubsPlease] Show - 01 (1080p) [ABCD1234]", "SubsPlease.Show.-.01.1080p.ABCD1234")]
    #[case("  Show   Season 2  ", "Show.Season.2")]
    #[case("Show: The Movie! & More", "Show.The.Movie.More")]
    #[case("Shōjo Show.mkv", "Shōjo.Show.mkv")]
    #[case("[]()", "")]
    fn test_slug(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slug(name), expected);
    }

    #[test]
    fn test_pack_urls_are_encoded() {
        let urls = Urls::new("https://example.org/");
        assert_eq!(urls.base(), "https://example.org");
        assert_eq!(
            urls.complete_pack(7, "[Group] Shōjo Show"),
            "https://example.org/torattachpk/7/Group.Sh%C5%8Djo.Show_attachments.7z"
        );
        assert_eq!(
            urls.episode_pack(42, "[Group] Show - 03 [1080p].mkv"),
            "https://example.org/attachpk/42/Group.Show.-.03.1080p.mkv_attachments.7z"
        );
    }
}
