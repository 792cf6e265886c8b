//! Known engine names.
//!
//! The engine names dictionary keys, declaration kinds, and syntax kinds
//! with UIDs. When a UID resolves to one of the names listed here, the
//! UID cache stores the enumeration's `&'static str` instead of the
//! freshly decoded bytes, so repeated lookups of the same concept always
//! yield the same string.

macro_rules! known_names {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Canonical wire string.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Look up the member whose canonical string is `name`.
            pub fn from_name(name: &str) -> Option<$name> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

known_names! {
    /// Dictionary keys that appear in engine responses.
    pub enum DocumentKey {
        Accessibility => "key.accessibility",
        AnnotatedDeclaration => "key.annotated_decl",
        Attribute => "key.attribute",
        Attributes => "key.attributes",
        BodyLength => "key.bodylength",
        BodyOffset => "key.bodyoffset",
        DiagnosticStage => "key.diagnostic_stage",
        DocColumn => "key.doc.column",
        DocComment => "key.doc.comment",
        DocDeclaration => "key.doc.declaration",
        DocDiscussion => "key.doc.discussion",
        DocFile => "key.doc.file",
        DocFullAsXml => "key.doc.full_as_xml",
        DocLine => "key.doc.line",
        DocName => "key.doc.name",
        DocParameters => "key.doc.parameters",
        DocResultDiscussion => "key.doc.result_discussion",
        DocType => "key.doc.type",
        DocumentationComment => "key.doccomment",
        Elements => "key.elements",
        FilePath => "key.filepath",
        FullyAnnotatedDeclaration => "key.fully_annotated_decl",
        InheritedTypes => "key.inheritedtypes",
        Kind => "key.kind",
        Length => "key.length",
        ModuleName => "key.modulename",
        Name => "key.name",
        NameLength => "key.namelength",
        NameOffset => "key.nameoffset",
        Offset => "key.offset",
        OverrideUsrs => "key.overrides",
        ParsedDeclaration => "key.parsed_declaration",
        ParsedScopeEnd => "key.parsed_scope.end",
        ParsedScopeStart => "key.parsed_scope.start",
        SetterAccessibility => "key.setter_accessibility",
        SourceText => "key.sourcetext",
        Substructure => "key.substructure",
        SyntaxMap => "key.syntaxmap",
        TypeName => "key.typename",
        TypeUsr => "key.typeusr",
        Usr => "key.usr",
    }
}

known_names! {
    /// Swift and Objective-C declaration kinds.
    pub enum DeclarationKind {
        Associatedtype => "source.lang.swift.decl.associatedtype",
        Class => "source.lang.swift.decl.class",
        Enum => "source.lang.swift.decl.enum",
        Enumcase => "source.lang.swift.decl.enumcase",
        Enumelement => "source.lang.swift.decl.enumelement",
        Extension => "source.lang.swift.decl.extension",
        ExtensionClass => "source.lang.swift.decl.extension.class",
        ExtensionEnum => "source.lang.swift.decl.extension.enum",
        ExtensionProtocol => "source.lang.swift.decl.extension.protocol",
        ExtensionStruct => "source.lang.swift.decl.extension.struct",
        FunctionAccessorAddress => "source.lang.swift.decl.function.accessor.address",
        FunctionAccessorDidset => "source.lang.swift.decl.function.accessor.didset",
        FunctionAccessorGetter => "source.lang.swift.decl.function.accessor.getter",
        FunctionAccessorMutableaddress => "source.lang.swift.decl.function.accessor.mutableaddress",
        FunctionAccessorSetter => "source.lang.swift.decl.function.accessor.setter",
        FunctionAccessorWillset => "source.lang.swift.decl.function.accessor.willset",
        FunctionConstructor => "source.lang.swift.decl.function.constructor",
        FunctionDestructor => "source.lang.swift.decl.function.destructor",
        FunctionFree => "source.lang.swift.decl.function.free",
        FunctionMethodClass => "source.lang.swift.decl.function.method.class",
        FunctionMethodInstance => "source.lang.swift.decl.function.method.instance",
        FunctionMethodStatic => "source.lang.swift.decl.function.method.static",
        FunctionOperator => "source.lang.swift.decl.function.operator",
        FunctionOperatorInfix => "source.lang.swift.decl.function.operator.infix",
        FunctionOperatorPostfix => "source.lang.swift.decl.function.operator.postfix",
        FunctionOperatorPrefix => "source.lang.swift.decl.function.operator.prefix",
        FunctionSubscript => "source.lang.swift.decl.function.subscript",
        GenericTypeParam => "source.lang.swift.decl.generic_type_param",
        Module => "source.lang.swift.decl.module",
        PrecedenceGroup => "source.lang.swift.decl.precedencegroup",
        Protocol => "source.lang.swift.decl.protocol",
        Struct => "source.lang.swift.decl.struct",
        Typealias => "source.lang.swift.decl.typealias",
        VarClass => "source.lang.swift.decl.var.class",
        VarGlobal => "source.lang.swift.decl.var.global",
        VarInstance => "source.lang.swift.decl.var.instance",
        VarLocal => "source.lang.swift.decl.var.local",
        VarParameter => "source.lang.swift.decl.var.parameter",
        VarStatic => "source.lang.swift.decl.var.static",
        ObjcCategory => "sourcekitten.source.lang.objc.decl.category",
        ObjcClass => "sourcekitten.source.lang.objc.decl.class",
        ObjcConstant => "sourcekitten.source.lang.objc.decl.constant",
        ObjcEnum => "sourcekitten.source.lang.objc.decl.enum",
        ObjcEnumcase => "sourcekitten.source.lang.objc.decl.enumcase",
        ObjcInitializer => "sourcekitten.source.lang.objc.decl.initializer",
        ObjcMethodClass => "sourcekitten.source.lang.objc.decl.method.class",
        ObjcMethodInstance => "sourcekitten.source.lang.objc.decl.method.instance",
        ObjcProperty => "sourcekitten.source.lang.objc.decl.property",
        ObjcProtocol => "sourcekitten.source.lang.objc.decl.protocol",
        ObjcTypedef => "sourcekitten.source.lang.objc.decl.typedef",
        ObjcFunction => "sourcekitten.source.lang.objc.decl.function",
        ObjcMark => "sourcekitten.source.lang.objc.mark",
        ObjcField => "sourcekitten.source.lang.objc.decl.field",
        ObjcIvar => "sourcekitten.source.lang.objc.decl.ivar",
        ObjcModule => "sourcekitten.source.lang.objc.module.import",
        ObjcUnexposed => "sourcekitten.source.lang.objc.decl.unexposed",
    }
}

known_names! {
    /// Syntax highlighting kinds.
    pub enum SyntaxKind {
        Argument => "source.lang.swift.syntaxtype.argument",
        AttributeBuiltin => "source.lang.swift.syntaxtype.attribute.builtin",
        AttributeId => "source.lang.swift.syntaxtype.attribute.id",
        BuildconfigId => "source.lang.swift.syntaxtype.buildconfig.id",
        BuildconfigKeyword => "source.lang.swift.syntaxtype.buildconfig.keyword",
        Comment => "source.lang.swift.syntaxtype.comment",
        CommentMark => "source.lang.swift.syntaxtype.comment.mark",
        CommentUrl => "source.lang.swift.syntaxtype.comment.url",
        DocComment => "source.lang.swift.syntaxtype.doccomment",
        DocCommentField => "source.lang.swift.syntaxtype.doccomment.field",
        Identifier => "source.lang.swift.syntaxtype.identifier",
        Keyword => "source.lang.swift.syntaxtype.keyword",
        Number => "source.lang.swift.syntaxtype.number",
        ObjectLiteral => "source.lang.swift.syntaxtype.objectliteral",
        Parameter => "source.lang.swift.syntaxtype.parameter",
        Placeholder => "source.lang.swift.syntaxtype.placeholder",
        PoundDirectiveKeyword => "source.lang.swift.syntaxtype.pounddirective.keyword",
        String => "source.lang.swift.syntaxtype.string",
        StringInterpolationAnchor => "source.lang.swift.syntaxtype.string_interpolation_anchor",
        Typeidentifier => "source.lang.swift.syntaxtype.typeidentifier",
    }
}

/// Map a raw resolved name onto its canonical `&'static str`, if the name
/// belongs to one of the known enumerations.
///
/// Document keys are checked first, then declaration kinds, then syntax
/// kinds. The three sets are disjoint, so the order only affects cost.
pub fn canonicalize(raw: &str) -> Option<&'static str> {
    DocumentKey::from_name(raw)
        .map(DocumentKey::as_str)
        .or_else(|| DeclarationKind::from_name(raw).map(DeclarationKind::as_str))
        .or_else(|| SyntaxKind::from_name(raw).map(SyntaxKind::as_str))
}
