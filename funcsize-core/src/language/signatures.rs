//! Ordered declaration patterns for brace-delimited languages
//!
//! Each language has a small ordered set of rules. Rules run against the
//! lexer's code view of a line, so string contents and comments never
//! match. A rule captures the declared `name` and, where the shape has one,
//! the return type `ret`. Keywords are rejected in either position so that
//! control flow (`if (x) {`) and expressions (`return foo(x);`,
//! `new Foo() {`) are not mistaken for declarations.

use super::Language;
use regex::Regex;
use std::sync::OnceLock;

/// One declaration shape
struct SignatureRule {
    regex: Regex,
}

/// Ordered rule set for one language
pub struct SignatureSet {
    rules: Vec<SignatureRule>,
    reserved: &'static [&'static str],
}

impl SignatureSet {
    fn new(patterns: &[&str], reserved: &'static [&'static str]) -> Self {
        let rules = patterns
            .iter()
            .map(|p| SignatureRule {
                regex: Regex::new(p).expect("signature pattern must compile"),
            })
            .collect();
        SignatureSet { rules, reserved }
    }

    /// Get the shared rule set for a brace-family language
    ///
    /// Returns `None` for languages outside the brace family.
    pub fn for_language(language: Language) -> Option<&'static SignatureSet> {
        static ECMASCRIPT: OnceLock<SignatureSet> = OnceLock::new();
        static JAVA: OnceLock<SignatureSet> = OnceLock::new();
        static CSHARP: OnceLock<SignatureSet> = OnceLock::new();

        match language {
            Language::JavaScript | Language::TypeScript => Some(
                ECMASCRIPT.get_or_init(|| SignatureSet::new(ECMASCRIPT_RULES, ECMASCRIPT_RESERVED)),
            ),
            Language::Java => Some(JAVA.get_or_init(|| SignatureSet::new(JAVA_RULES, JAVA_RESERVED))),
            Language::CSharp => {
                Some(CSHARP.get_or_init(|| SignatureSet::new(CSHARP_RULES, CSHARP_RESERVED)))
            }
            Language::Python => None,
        }
    }

    /// Match a code line against the rules in order
    ///
    /// Returns the declared name (empty when the shape has no name, such as
    /// `export default function () {`), or `None` if no rule accepts the line.
    pub fn match_declaration(&self, code: &str) -> Option<String> {
        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(code) else {
                continue;
            };
            let name = caps.name("name").map_or("", |m| m.as_str());
            let ret = caps.name("ret").map_or("", |m| m.as_str());
            if self.is_reserved(name) || self.is_reserved(ret) {
                continue;
            }
            return Some(name.to_string());
        }
        None
    }

    fn is_reserved(&self, word: &str) -> bool {
        !word.is_empty() && self.reserved.contains(&word)
    }
}

const ECMASCRIPT_RULES: &[&str] = &[
    // function name(...)  /  export default async function* name<T>(...)
    r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function\b\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)?\s*(?:<[^>]*>)?\s*\(",
    // const name = (...) =>   /   const name = async function (
    r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::[^=]*)?=\s*(?:async\s+)?(?:function\b\s*\*?\s*[\w$]*\s*(?:<[^>]*>)?\s*\(|(?:<[^>]*>\s*)?(?:\([^()]*\)|[A-Za-z_$][\w$]*)\s*(?::\s*[^=]+?)?\s*=>|\([^)]*$)",
    // module.exports.name = function (  /  Foo.prototype.name = (...) =>
    r"^\s*(?:[A-Za-z_$][\w$]*\.)+(?P<name>[A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|(?:\([^()]*\)|[A-Za-z_$][\w$]*)\s*=>)",
    // name: function (  /  name: (...) =>
    r"^\s*(?P<name>[A-Za-z_$][\w$]*)\s*:\s*(?:async\s+)?(?:function\b\s*\*?\s*[\w$]*\s*\(|(?:\([^()]*\)|[A-Za-z_$][\w$]*)\s*=>)",
    // class field arrow: private handle = (e) =>
    r"^\s*(?:(?:public|private|protected|static|readonly|override)\s+)*(?P<name>#?[A-Za-z_$][\w$]*)\s*(?::[^=]*)?=\s*(?:async\s+)?(?:\([^()]*\)|[A-Za-z_$][\w$]*)\s*(?::\s*[^=]+?)?\s*=>",
    // method: async name(...) {   /   static get value(): T {
    r"^\s*(?:(?:public|private|protected|static|readonly|abstract|override|async|get|set|declare)\s+)*\*?\s*(?P<name>#?[A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\([^()]*\)\s*(?::\s*[^{;]+?)?\s*\{",
];

const ECMASCRIPT_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "typeof", "new", "else", "do",
    "try", "await", "yield", "delete", "void", "throw", "case", "in", "of", "instanceof",
    "function", "super", "import",
];

const JAVA_RULES: &[&str] = &[
    // [annotations] [modifiers] [<T>] ReturnType name(
    r"^\s*(?:@[\w.]+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|synchronized|abstract|native|default|strictfp)\s+)*(?:<[^()]+>\s+)?(?P<ret>[\w$.]+(?:\s*<[^()]*>)?(?:\s*\[\s*\])*)\s+(?P<name>[A-Za-z_$][\w$]*)\s*\(",
    // constructor: [annotations] access [<T>] Name(
    r"^\s*(?:@[\w.]+(?:\([^)]*\))?\s+)*(?:public|private|protected)\s+(?:<[^()]+>\s+)?(?P<name>[A-Z][\w$]*)\s*\(",
];

const JAVA_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "else", "throw",
    "try", "do", "case", "assert", "super", "this", "public", "private", "protected", "static",
    "final", "abstract", "native", "default", "strictfp", "transient", "volatile", "class",
    "interface", "enum", "record", "import", "package", "throws", "yield",
];

const CSHARP_RULES: &[&str] = &[
    // [attributes] [modifiers] ReturnType name<T>(
    r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|unsafe|new|partial|readonly)\s+)*(?P<ret>[\w.]+(?:\s*<[^()]*>)?\??(?:\s*\[[\s,]*\])*)\s+(?P<name>@?[A-Za-z_][\w]*)\s*(?:<[^()]*>)?\s*\(",
    // constructor: [attributes] modifiers Name(
    r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static)\s+)+(?P<name>[A-Z_][\w]*)\s*\(",
];

const CSHARP_RESERVED: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "fixed", "return", "new",
    "else", "throw", "try", "do", "case", "await", "yield", "nameof", "typeof", "sizeof",
    "default", "checked", "unchecked", "base", "this", "get", "set", "add", "remove", "public",
    "private", "protected", "internal", "static", "virtual", "override", "abstract", "sealed",
    "async", "extern", "unsafe", "partial", "readonly", "class", "struct", "interface", "enum",
    "record", "namespace", "when", "where", "in", "is", "as", "out", "ref", "var",
];
