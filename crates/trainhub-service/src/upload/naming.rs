//! Generated file names.

use uuid::Uuid;

/// Longest extension taken from a caller-supplied name.
const MAX_EXTENSION_LEN: usize = 10;

/// A random lower-case hex string of `len` characters (at most 32).
pub fn short_hash(len: usize) -> String {
    let mut hash = Uuid::new_v4().simple().to_string();
    hash.truncate(len);
    hash
}

/// `<project><category><index+1>_<hash>.<ext>`
pub fn entry_file_name(
    project: &str,
    category: &str,
    index: usize,
    hash: &str,
    ext: &str,
) -> String {
    format!("{project}{category}{}_{hash}.{ext}", index + 1)
}

/// `<project>model<hash>.<ext>`
pub fn model_file_name(project: &str, hash: &str, ext: &str) -> String {
    format!("{project}model{hash}.{ext}")
}

/// Lower-case extension of a caller-supplied file name.
///
/// Names without a stem (`.png`) or with a non-alphanumeric extension give
/// `None`.
pub fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extension of a recognised image format, read from the magic bytes.
pub fn sniff_extension(data: &[u8]) -> Option<String> {
    let format = image::guess_format(data).ok()?;
    format.extensions_str().first().map(|ext| ext.to_string())
}
