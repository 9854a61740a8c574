//! File classification by extension and MIME type.
//!
//! Every indexed entry gets exactly one [`FileCategory`], which drives the
//! icon name in the rendered listing and the `type` key in the metadata
//! side-car. Classification is a pure function of the entry's name,
//! extension, and guessed MIME type — it never touches file contents, so a
//! misnamed file is classified by its name, deliberately.
//!
//! ## Rule order
//!
//! [`classify`] evaluates an ordered rule list where *later rules override
//! earlier ones*. The only short-circuit is the MIME top-level type check:
//! `audio/*`, `image/*`, and `video/*` win immediately. Everything else
//! falls through the whole list, so e.g. `Dockerfile.txt` ends up as `code`
//! (the Dockerfile name rule sits after the text-extension rule), and
//! `env.production` ends up as `config`. Unknown inputs degrade to the
//! `file` fallback; classification never fails.

use serde::Serialize;
use std::fmt;

/// Semantic kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Directory,
    File,
    Document,
    Presentation,
    Spreadsheet,
    Compressed,
    Data,
    Html,
    Pdf,
    Ebook,
    Code,
    Script,
    Text,
    Config,
    Audio,
    Image,
    Video,
    Link,
}

impl FileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Directory => "directory",
            FileCategory::File => "file",
            FileCategory::Document => "document",
            FileCategory::Presentation => "presentation",
            FileCategory::Spreadsheet => "spreadsheet",
            FileCategory::Compressed => "compressed",
            FileCategory::Data => "data",
            FileCategory::Html => "html",
            FileCategory::Pdf => "pdf",
            FileCategory::Ebook => "ebook",
            FileCategory::Code => "code",
            FileCategory::Script => "script",
            FileCategory::Text => "text",
            FileCategory::Config => "config",
            FileCategory::Audio => "audio",
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Link => "link",
        }
    }

    /// Whether the category counts towards media dominance of a directory.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            FileCategory::Audio | FileCategory::Image | FileCategory::Video
        )
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "html", "htm", "md", "markdown", "mkd", "rst", "ad", "asc", "asciidoc",
];
const CODE_EXTENSIONS: &[&str] = &["py", "java", "cpp", "c", "h", "pl"];
const EBOOK_EXTENSIONS: &[&str] = &["epub", "azw", "fb2", "fb3"];
const SHELL_EXTENSIONS: &[&str] = &["csh", "sh", "zsh"];
const CONFIG_EXTENSIONS: &[&str] = &[
    "yaml", "yml", "config", "cfg", "conf", "properties", "toml", "tml",
];
const LINK_EXTENSIONS: &[&str] = &["url", "link"];
const ARCHIVE_SUBTYPES: &[&str] = &["zip", "gzip", "bzip2", "tar", "rar", "7z", "xz"];

/// Classify an entry from its name, lowercase extension, and MIME guess.
///
/// `ext` is the extension without the leading dot; `mime` is a full
/// `type/subtype` string. Both may be empty.
pub fn classify(name: &str, ext: &str, mime: &str) -> FileCategory {
    let (top, subtype) = split_mime(mime);
    match top.as_str() {
        "audio" => return FileCategory::Audio,
        "image" => return FileCategory::Image,
        "video" => return FileCategory::Video,
        _ => {}
    }

    // Vendor noise like `x-` and `vnd.` is stripped so that e.g.
    // `application/vnd.ms-excel` matches on "excel".
    let subtype = subtype.replace("x-", "").replace("vnd.", "");
    let subtype = subtype.as_str();

    // Ordered rule list; later rules override earlier matches.
    let mut category = FileCategory::File;
    if subtype.contains("opendocument")
        || subtype.contains("document")
        || matches!(subtype, "rtf" | "visio" | "abiword")
    {
        category = FileCategory::Document;
    }
    if subtype.contains("presentation") || subtype.contains("powerpoint") {
        category = FileCategory::Presentation;
    }
    if subtype.contains("spreadsheet") || subtype.contains("excel") {
        category = FileCategory::Spreadsheet;
    }
    if ARCHIVE_SUBTYPES.contains(&subtype) || subtype.contains("compressed") {
        category = FileCategory::Compressed;
    }
    if subtype == "json" || subtype.ends_with("+json") {
        category = FileCategory::Data;
    }
    if matches!(subtype, "xml" | "xaml")
        || subtype.ends_with("+xml")
        || matches!(ext, "xml" | "xslt" | "xhtml")
    {
        category = FileCategory::Data;
    }
    if subtype == "pdf" || matches!(ext, "djv" | "djvu") {
        category = FileCategory::Pdf;
    }
    if EBOOK_EXTENSIONS.contains(&subtype)
        || EBOOK_EXTENSIONS.contains(&ext)
        || subtype.contains("ebook")
    {
        category = FileCategory::Ebook;
    }
    if LINK_EXTENSIONS.contains(&subtype) || LINK_EXTENSIONS.contains(&ext) {
        category = FileCategory::Link;
    }
    if CODE_EXTENSIONS.contains(&subtype) || CODE_EXTENSIONS.contains(&ext) {
        category = FileCategory::Code;
    }
    if TEXT_EXTENSIONS.contains(&subtype) || TEXT_EXTENSIONS.contains(&ext) {
        category = FileCategory::Text;
    }
    if SHELL_EXTENSIONS.contains(&subtype) || SHELL_EXTENSIONS.contains(&ext) {
        category = FileCategory::Script;
    }
    if CONFIG_EXTENSIONS.contains(&subtype) || CONFIG_EXTENSIONS.contains(&ext) {
        category = FileCategory::Config;
    }
    if name.starts_with("env.") {
        category = FileCategory::Config;
    }
    if name.contains("Dockerfile") {
        category = FileCategory::Code;
    }

    log::debug!("classify({name}, {ext}, {mime}) -> {category}");
    category
}

/// Split `type/subtype` into lowercase halves; either may be empty.
fn split_mime(mime: &str) -> (String, String) {
    let mut parts = mime.splitn(2, '/');
    let top = parts.next().unwrap_or("").trim().to_lowercase();
    let subtype = parts.next().unwrap_or("").trim().to_lowercase();
    (top, subtype)
}
