//! Translation between logical paths and flat storage keys.
//!
//! Providers store blobs under dotted keys with no notion of directories:
//!
//! ```text
//! logical path                     storage key
//! test.txt                         App.test.txt
//! Templates/page one.html          App.Templates.page one.html
//! 1.2.3/test.txt                   App._1._2._3.test.txt
//! ```
//!
//! Directory segments are rendered as namespace elements: separators become
//! `.`, spaces and dashes become `_`, and a segment that would start with a
//! digit gets a leading `_`. The file name is kept verbatim. Keys are always
//! compared case-insensitively.

pub use serfs_provider::namespace_of;

/// Separator used between logical path segments.
pub const SEPARATOR: char = '/';

const ALT_SEPARATOR: char = '\\';

/// Strip a single leading `./` or `.\`, then a single leading `/` or `\`.
///
/// Logical paths are always relative to the mount root.
///
/// ```rust
/// use serfs_core::key::strip_path_markers;
///
/// assert_eq!(strip_path_markers("./a/b.txt"), "a/b.txt");
/// assert_eq!(strip_path_markers(".\\a.txt"), "a.txt");
/// assert_eq!(strip_path_markers("/a.txt"), "a.txt");
/// assert_eq!(strip_path_markers("//a.txt"), "/a.txt");
/// ```
pub fn strip_path_markers(path: &str) -> &str {
    let path = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix(".\\"))
        .unwrap_or(path);
    path.strip_prefix(SEPARATOR)
        .or_else(|| path.strip_prefix(ALT_SEPARATOR))
        .unwrap_or(path)
}

/// Compute the storage key for `logical_path` under `mount_folder`.
///
/// Pure and total: the same inputs always produce the same key.
///
/// ```rust
/// use serfs_core::key::to_key;
///
/// assert_eq!(to_key("App", "", "test.txt"), "App.test.txt");
/// assert_eq!(to_key("App", "Templates/", "a b/c-d/404.txt"), "App.Templates.a_b.c_d.404.txt");
/// assert_eq!(to_key("App", "", "1.2.3/test.txt"), "App._1._2._3.test.txt");
/// ```
pub fn to_key(provider_prefix: &str, mount_folder: &str, logical_path: &str) -> String {
    let requested = format!("{}{}", mount_folder, strip_path_markers(logical_path))
        .replace(ALT_SEPARATOR, "/");

    let (directory, filename) = match requested.rfind(SEPARATOR) {
        Some(split) => requested.split_at(split + 1),
        None => ("", requested.as_str()),
    };

    let mut key = String::with_capacity(provider_prefix.len() + requested.len() + 8);
    key.push_str(provider_prefix);
    render_directory(directory, &mut key);
    key.push_str(filename);
    key
}

/// Key prefix shared by everything inside folder `base_name`.
///
/// `base_name` is forced to end with a separator, so `"A folder"` and
/// `"A folder/"` give the same prefix. The root folder (`""` or `"/"`) gives
/// the bare provider prefix followed by the mount folder's namespace.
///
/// ```rust
/// use serfs_core::key::folder_prefix;
///
/// assert_eq!(folder_prefix("App", "", "A folder"), "App.A_folder.");
/// assert_eq!(folder_prefix("App", "Templates/", "/"), "App.Templates.");
/// assert_eq!(folder_prefix("App", "", ""), "App.");
/// ```
pub fn folder_prefix(provider_prefix: &str, mount_folder: &str, base_name: &str) -> String {
    let mut pattern = ensure_trailing_separator(base_name);
    pattern.push('*');
    let mut key = to_key(provider_prefix, mount_folder, &pattern);
    key.pop();
    key
}

/// Append a separator unless `path` already ends with one.
pub fn ensure_trailing_separator(path: &str) -> String {
    let mut owned = path.to_string();
    if !ends_with_separator(path) {
        owned.push(SEPARATOR);
    }
    owned
}

/// Normalize a mount folder: drop one leading separator, and make non-empty
/// folders end with one.
///
/// ```rust
/// use serfs_core::key::normalize_mount_folder;
///
/// assert_eq!(normalize_mount_folder("/Templates"), "Templates/");
/// assert_eq!(normalize_mount_folder("Templates/"), "Templates/");
/// assert_eq!(normalize_mount_folder(""), "");
/// assert_eq!(normalize_mount_folder("/"), "");
/// ```
pub fn normalize_mount_folder(folder: &str) -> String {
    let folder = folder
        .strip_prefix(SEPARATOR)
        .or_else(|| folder.strip_prefix(ALT_SEPARATOR))
        .unwrap_or(folder);
    if folder.is_empty() {
        String::new()
    } else {
        ensure_trailing_separator(folder)
    }
}

/// Case-insensitive prefix strip.
///
/// Returns the remainder of `key` after `prefix`, compared character by
/// character with Unicode lowercase folding. The remainder always starts on
/// a character boundary of `key`.
pub fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let mut key_chars = key.char_indices();
    let mut consumed = 0;
    for p in prefix.chars() {
        let (i, k) = key_chars.next()?;
        if !char_eq_ignore_case(k, p) {
            return None;
        }
        consumed = i + k.len_utf8();
    }
    Some(&key[consumed..])
}

/// Case-insensitive key equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    strip_prefix_ignore_case(a, b).is_some_and(str::is_empty)
}

fn char_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn ends_with_separator(path: &str) -> bool {
    path.ends_with(SEPARATOR) || path.ends_with(ALT_SEPARATOR)
}

/// Render a directory (with trailing separator, or empty) onto `key`.
///
/// The leading `.` joins the provider prefix; it counts as a segment
/// boundary for digit escaping.
fn render_directory(directory: &str, key: &mut String) {
    key.push('.');
    for c in directory.chars() {
        let c = match c {
            SEPARATOR => '.',
            ' ' | '-' => '_',
            c => c,
        };
        if c.is_ascii_digit() && key.ends_with('.') {
            key.push('_');
        }
        key.push(c);
    }
}
