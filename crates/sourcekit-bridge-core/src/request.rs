//! Typed requests and their wire encoding.
//!
//! A [`Request`] names one engine operation and carries only the fields
//! that operation needs. [`RequestBuilder::build`] turns it into a
//! [`WireObject`] keyed by the engine's canonical key strings. Apart from
//! the SDK path used by interface requests, the output depends on nothing
//! but the request's own fields.

use sha2::{Digest, Sha256};

use crate::wire::WireObject;

/// Canonical request dictionary keys.
pub mod key {
    pub const REQUEST: &str = "key.request";
    pub const NAME: &str = "key.name";
    pub const SOURCE_FILE: &str = "key.sourcefile";
    pub const FILE_PATH: &str = "key.filepath";
    pub const SOURCE_TEXT: &str = "key.sourcetext";
    pub const OFFSET: &str = "key.offset";
    pub const LENGTH: &str = "key.length";
    pub const LINE: &str = "key.line";
    pub const COMPILER_ARGS: &str = "key.compilerargs";
    pub const USR: &str = "key.usr";
    pub const MODULE_NAME: &str = "key.modulename";
    pub const FORMAT_OPTIONS: &str = "key.editor.format.options";
    pub const INDENT_WIDTH: &str = "key.editor.format.indentwidth";
    pub const TAB_WIDTH: &str = "key.editor.format.tabwidth";
    pub const USE_TABS: &str = "key.editor.format.usetabs";
}

/// Canonical request kind tags.
pub mod kind {
    pub const EDITOR_OPEN: &str = "source.request.editor.open";
    pub const CURSOR_INFO: &str = "source.request.cursorinfo";
    pub const CODE_COMPLETE: &str = "source.request.codecomplete";
    pub const INTERFACE_HEADER: &str = "source.request.editor.open.interface.header";
    pub const MODULE_INTERFACE: &str = "source.request.editor.open.interface";
    pub const FIND_USR: &str = "source.request.editor.find_usr";
    pub const INDEX_SOURCE: &str = "source.request.indexsource";
    pub const FORMAT_TEXT: &str = "source.request.editor.formattext";
    pub const REPLACE_TEXT: &str = "source.request.editor.replacetext";
    pub const CUSTOM: &str = "custom";
}

/// A file to open: an on-disk path, or text with no path.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: Option<String>,
    pub contents: String,
}

impl SourceFile {
    pub fn at_path(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            contents: contents.into(),
        }
    }

    pub fn text(contents: impl Into<String>) -> Self {
        Self {
            path: None,
            contents: contents.into(),
        }
    }

    /// Stable synthetic name for path-less files: hex SHA-256 of the contents.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.contents.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// One engine operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    EditorOpen {
        file: SourceFile,
    },
    CursorInfo {
        file: String,
        offset: i64,
        arguments: Vec<String>,
    },
    /// A pre-built request, passed to the engine unchanged.
    CustomRequest {
        request: WireObject,
    },
    CodeCompletion {
        file: String,
        contents: String,
        offset: i64,
        arguments: Vec<String>,
    },
    /// Generated interface of an Objective-C header.
    Interface {
        file: String,
        uuid: String,
    },
    FindUsr {
        file: String,
        usr: String,
    },
    Index {
        file: String,
        arguments: Vec<String>,
    },
    Format {
        file: String,
        line: i64,
        use_tabs: bool,
        indent_width: i64,
    },
    ReplaceText {
        file: String,
        offset: i64,
        length: i64,
        source_text: String,
    },
    /// Generated interface of a whole module.
    ModuleInfo {
        module: String,
        arguments: Vec<String>,
        session: String,
    },
}

impl Request {
    /// The request kind tag, for logs and diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Request::EditorOpen { .. } => kind::EDITOR_OPEN,
            Request::CursorInfo { .. } => kind::CURSOR_INFO,
            Request::CustomRequest { request } => request
                .get(key::REQUEST)
                .and_then(WireObject::as_str)
                .unwrap_or(kind::CUSTOM),
            Request::CodeCompletion { .. } => kind::CODE_COMPLETE,
            Request::Interface { .. } => kind::INTERFACE_HEADER,
            Request::FindUsr { .. } => kind::FIND_USR,
            Request::Index { .. } => kind::INDEX_SOURCE,
            Request::Format { .. } => kind::FORMAT_TEXT,
            Request::ReplaceText { .. } => kind::REPLACE_TEXT,
            Request::ModuleInfo { .. } => kind::MODULE_INTERFACE,
        }
    }
}

/// Encodes [`Request`]s as [`WireObject`]s.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    sdk_path: String,
}

impl RequestBuilder {
    /// `sdk_path` is passed as `-isysroot` for interface requests.
    pub fn new(sdk_path: impl Into<String>) -> Self {
        Self {
            sdk_path: sdk_path.into(),
        }
    }

    pub fn sdk_path(&self) -> &str {
        &self.sdk_path
    }

    pub fn build(&self, request: &Request) -> WireObject {
        match request {
            Request::EditorOpen { file } => match &file.path {
                Some(path) => WireObject::dictionary([
                    (key::REQUEST, WireObject::uid(kind::EDITOR_OPEN)),
                    (key::NAME, WireObject::string(path)),
                    (key::SOURCE_FILE, WireObject::string(path)),
                ]),
                None => WireObject::dictionary([
                    (key::REQUEST, WireObject::uid(kind::EDITOR_OPEN)),
                    (key::NAME, WireObject::string(file.content_hash())),
                    (key::SOURCE_TEXT, WireObject::string(&file.contents)),
                ]),
            },
            Request::CursorInfo {
                file,
                offset,
                arguments,
            } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::CURSOR_INFO)),
                (key::NAME, WireObject::string(file)),
                (key::SOURCE_FILE, WireObject::string(file)),
                (key::OFFSET, WireObject::Int64(*offset)),
                (key::COMPILER_ARGS, WireObject::strings(arguments)),
            ]),
            Request::CustomRequest { request } => request.clone(),
            Request::CodeCompletion {
                file,
                contents,
                offset,
                arguments,
            } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::CODE_COMPLETE)),
                (key::NAME, WireObject::string(file)),
                (key::SOURCE_FILE, WireObject::string(file)),
                (key::SOURCE_TEXT, WireObject::string(contents)),
                (key::OFFSET, WireObject::Int64(*offset)),
                (key::COMPILER_ARGS, WireObject::strings(arguments)),
            ]),
            Request::Interface { file, uuid } => {
                let arguments = [
                    "-x",
                    "objective-c",
                    file.as_str(),
                    "-isysroot",
                    self.sdk_path.as_str(),
                ];
                WireObject::dictionary([
                    (key::REQUEST, WireObject::uid(kind::INTERFACE_HEADER)),
                    (key::NAME, WireObject::string(uuid)),
                    (key::FILE_PATH, WireObject::string(file)),
                    (key::COMPILER_ARGS, WireObject::strings(arguments)),
                ])
            }
            Request::FindUsr { file, usr } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::FIND_USR)),
                (key::USR, WireObject::string(usr)),
                (key::SOURCE_FILE, WireObject::string(file)),
            ]),
            Request::Index { file, arguments } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::INDEX_SOURCE)),
                (key::SOURCE_FILE, WireObject::string(file)),
                (key::COMPILER_ARGS, WireObject::strings(arguments)),
            ]),
            Request::Format {
                file,
                line,
                use_tabs,
                indent_width,
            } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::FORMAT_TEXT)),
                (key::NAME, WireObject::string(file)),
                (key::LINE, WireObject::Int64(*line)),
                (
                    key::FORMAT_OPTIONS,
                    WireObject::dictionary([
                        (key::INDENT_WIDTH, WireObject::Int64(*indent_width)),
                        // Tab width always tracks the indent width.
                        (key::TAB_WIDTH, WireObject::Int64(*indent_width)),
                        (key::USE_TABS, WireObject::Int64(i64::from(*use_tabs))),
                    ]),
                ),
            ]),
            Request::ReplaceText {
                file,
                offset,
                length,
                source_text,
            } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::REPLACE_TEXT)),
                (key::NAME, WireObject::string(file)),
                (key::OFFSET, WireObject::Int64(*offset)),
                (key::LENGTH, WireObject::Int64(*length)),
                (key::SOURCE_TEXT, WireObject::string(source_text)),
            ]),
            Request::ModuleInfo {
                module,
                arguments,
                session,
            } => WireObject::dictionary([
                (key::REQUEST, WireObject::uid(kind::MODULE_INTERFACE)),
                (key::NAME, WireObject::string(session)),
                (key::COMPILER_ARGS, WireObject::strings(arguments)),
                (key::MODULE_NAME, WireObject::string(module)),
            ]),
        }
    }
}
