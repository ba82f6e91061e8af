//! Methodmaps: constructors, methods and properties.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use smol_str::SmolStr;

use crate::base::Range;
use crate::hir::{ItemDetail, Parent};
use crate::syntax::doc_comment_before;

use super::functions::{Callable, FunctionHeader};
use super::{Parser, State, is_keyword, scoped_key};

pub(super) static METHODMAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*methodmap\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+__nullable__)?(?:\s*[<:]\s*([A-Za-z_][A-Za-z0-9_]*))?",
    )
    .expect("invalid methodmap regex")
});

static MEMBER_FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*public\s+((?:(?:static|native)\s+)*)(?:([A-Za-z_][A-Za-z0-9_]*)(?:\s*\[\s*\])*\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\(",
    )
    .expect("invalid methodmap member regex")
});

static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*property\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*\[\s*\])*\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("invalid property regex")
});

impl Parser<'_> {
    pub(super) fn read_methodmap(&mut self, n: usize, caps: &Captures<'_>) {
        let Some(name) = caps.get(1) else {
            return;
        };
        let inherits = caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|parent| *parent != "__nullable__")
            .map(SmolStr::new);

        let range = Range::on_line(n as u32, name.start() as u32, name.len() as u32);
        let item = self
            .item(name.as_str(), range, ItemDetail::Methodmap { inherits })
            .with_full_range(self.line_range(n))
            .with_description(doc_comment_before(self.doc, n as u32));
        self.items.insert(name.as_str(), item);

        // A declaration with no body opens no context.
        let line = self.doc.masked_line(n);
        if line.contains(';') && !line.contains('{') {
            return;
        }
        let name = SmolStr::new(name.as_str());
        self.states.push(State::Methodmap {
            key: name.clone(),
            name,
        });
    }

    /// Constructors, methods and properties directly inside `methodmap`.
    pub(super) fn parse_methodmap_member(&mut self, n: usize, methodmap: &SmolStr) {
        let doc = self.doc;
        let line = doc.masked_line(n);

        if let Some(caps) = MEMBER_FN_RE.captures(line) {
            let (Some(name), Some(whole)) = (caps.get(3), caps.get(0)) else {
                return;
            };
            let return_type = caps.get(2).map(|m| m.as_str());
            if is_keyword(name.as_str()) || return_type.is_some_and(is_keyword) {
                return;
            }
            let header = FunctionHeader {
                modifiers: caps
                    .get(1)
                    .map_or_else(Vec::new, |m| m.as_str().split_whitespace().collect()),
                return_type,
                name: name.as_str(),
                name_col: name.start(),
                paren_col: whole.end() - 1,
            };
            let callable = if return_type.is_none() && name.as_str() == methodmap.as_str() {
                Callable::Constructor { parent: methodmap }
            } else {
                Callable::Method {
                    parent: methodmap,
                    enum_struct: false,
                }
            };
            self.read_function(n, header, callable);
            return;
        }

        if let Some(caps) = PROPERTY_RE.captures(line) {
            let (Some(type_name), Some(name)) = (caps.get(1), caps.get(2)) else {
                return;
            };
            let key = scoped_key(&[methodmap.as_str(), name.as_str()]);
            let range = Range::on_line(n as u32, name.start() as u32, name.len() as u32);
            let item = self
                .item(
                    name.as_str(),
                    range,
                    ItemDetail::Property {
                        type_name: SmolStr::new(type_name.as_str()),
                    },
                )
                .with_parent(Parent::Scope(methodmap.clone()))
                .with_full_range(self.line_range(n))
                .with_description(doc_comment_before(doc, n as u32));
            self.items.insert(key.clone(), item);
            self.states.push(State::Property { key });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::base::Position;
    use crate::hir::{ItemDetail, Parent, SymbolKind};
    use crate::parser::tests::parse;

    const SOURCE: &str = "\
methodmap Base __nullable__ {
    public native void m();
}

methodmap Derived < Base {
    public Derived(int value) {
        return view_as<Derived>(value);
    }

    /** Current health. */
    property int Health {
        public get() { return 1; }
        public set(int value) {
            int unused = value;
        }
    }

    public static Derived Find(int id) {
        Derived found = Derived(id);
        return found;
    }
}
int after;
";

    #[test]
    fn test_methodmap_inheritance() {
        let items = parse(SOURCE);
        assert_eq!(items.get("Base").and_then(|b| b.inherits().map(str::to_string)), None);
        let derived = items.get("Derived").unwrap();
        assert_eq!(derived.inherits(), Some("Base"));
        assert_eq!(derived.full_range.end, Position::new(21, 1));
    }

    #[test]
    fn test_methodmap_members() {
        let items = parse(SOURCE);

        let m = items.get("Base::m").unwrap();
        assert_eq!(m.kind(), SymbolKind::Method);
        assert_eq!(m.parent, Parent::scope("Base"));
        assert_eq!(m.enum_struct_name, None);

        let ctor = items.get("Derived::Derived").unwrap();
        assert_eq!(ctor.kind(), SymbolKind::Constructor);
        assert!(items.get("Derived::Derived::value").is_some());

        let health = items.get("Derived::Health").unwrap();
        assert_eq!(health.detail, ItemDetail::Property { type_name: "int".into() });
        assert_eq!(health.description.as_ref().map(|d| d.description.as_str()), Some("Current health."));
        assert_eq!(health.full_range.end, Position::new(15, 5));
        // Getter and setter bodies are skipped.
        assert!(items.get("set::value").is_none());
        assert!(items.items().all(|i| i.name != "unused"));

        let find = items.get("Derived::Find").unwrap();
        match &find.detail {
            ItemDetail::Method { signature, is_static } => {
                assert!(*is_static);
                assert_eq!(signature.return_type, "Derived");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(items.get("Derived::Find::found").map(|f| f.parent.clone()), Some(Parent::scope("Find")));
        assert!(items.get("after").is_some());
    }
}
