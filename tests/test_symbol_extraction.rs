//! Symbol extraction through the public parsing API.
//!
//! Covers re-parse stability, last-write-wins tables and the bounded enum
//! reader on malformed input.

use std::path::Path;

use pawnsym::hir::{GLOBAL_IDENTIFIER, ItemDetail};
use pawnsym::{EngineConfig, FileItems, FileUri, MemoryIncludeResolver, Range, SymbolKind, TextDocument, parse_file};
use rstest::rstest;

fn parse_with(text: &str, config: &EngineConfig) -> FileItems {
    let uri = FileUri::from_path(Path::new("/proj/plugin.sp"));
    let doc = TextDocument::new(text);
    parse_file(&uri, &doc, &MemoryIncludeResolver::new(), config)
}

fn parse(text: &str) -> FileItems {
    parse_with(text, &EngineConfig::default())
}

const PLUGIN: &str = r#"
#include <sourcemod>
#define MAX_PLAYERS 64

enum { FIRST, SECOND }
enum
{
    THIRD
}

enum struct Point {
    int x;
    int y;
    float Length() {
        return 0.0;
    }
}

methodmap Player < Entity {
    public Player(int client) {
        return view_as<Player>(client);
    }
    property int Health {
        public get() { return 100; }
    }
}

char g_Names[MAX_PLAYERS][32];

public void OnPluginStart() {
    Point p;
    p.x = 1;
    // int commented;
    PrintToServer("int quoted;");
}
"#;

#[test]
fn test_reparse_is_idempotent() {
    let first = parse(PLUGIN);
    let second = parse(PLUGIN);
    assert!(first.same_declarations(&second));

    let names = |items: &FileItems| -> Vec<(String, SymbolKind, Range, String)> {
        items
            .items()
            .map(|i| (i.name.to_string(), i.kind(), i.range, i.parent.as_str().to_string()))
            .collect()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn test_anonymous_enums_have_stable_distinct_keys() {
    let keys = |items: &FileItems| -> Vec<String> {
        items
            .entries()
            .filter(|(_, item)| item.kind() == SymbolKind::Enum)
            .map(|(key, _)| key.to_string())
            .collect()
    };
    let first = keys(&parse(PLUGIN));
    assert_eq!(first.len(), 2);
    assert_ne!(first[0], first[1]);
    for _ in 0..3 {
        assert_eq!(keys(&parse(PLUGIN)), first);
    }
}

#[test]
fn test_comments_and_strings_declare_nothing() {
    let items = parse(PLUGIN);
    assert!(items.items().all(|i| i.name != "commented" && i.name != "quoted"));
    // `p` is a local of OnPluginStart.
    let local = items.items().find(|i| i.name == "p").unwrap();
    assert!(local.parent.is("OnPluginStart"));
}

#[test]
fn test_last_definition_wins() {
    let items = parse("#define X 1\nint between;\n#define X 2\n");
    let xs: Vec<_> = items.items().filter(|i| i.name == "X").collect();
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].range.start.line, 2);
    assert_eq!(xs[0].detail, ItemDetail::Define { value: "2".into() });
}

#[rstest]
#[case::members("enum struct Point {\n    int x;\n}\n", "Point::x", SymbolKind::Property, "Point")]
#[case::methods("methodmap M {\n    public native void Run();\n}\n", "M::Run", SymbolKind::Method, "M")]
#[case::locals("void F(int arg) {\n}\n", "F::arg", SymbolKind::Variable, "F")]
#[case::method_locals("methodmap M {\n    public void Go(int v) {\n    }\n}\n", "M::Go::v", SymbolKind::Variable, "Go")]
#[case::enum_member("enum E { A }\n", "A", SymbolKind::EnumMember, GLOBAL_IDENTIFIER)]
fn test_scoped_keys(#[case] text: &str, #[case] key: &str, #[case] kind: SymbolKind, #[case] parent: &str) {
    let items = parse(text);
    let item = items.get(key).unwrap();
    assert_eq!(item.kind(), kind);
    assert_eq!(item.parent.as_str(), parent);
}

#[test]
fn test_unclosed_enum_is_truncated_at_ceiling() {
    let mut text = String::from("enum Runaway {\n");
    for idx in 0..20 {
        text.push_str(&format!("    R{idx},\n"));
    }
    let config = EngineConfig::default().with_enum_member_ceiling(5);
    let items = parse_with(&text, &config);

    assert!(items.get("Runaway").is_some());
    assert!(items.get("R0").is_some());
    assert!(items.get("R19").is_none());
}

#[test]
fn test_unclosed_block_keeps_registered_symbols() {
    let items = parse("int before;\nvoid F() {\n    int inside;\n");
    assert!(items.get("before").is_some());
    assert!(items.get("F").is_some());
    assert!(items.get("F::inside").is_some());
}
