//! Lexical context of a position: enclosing callable and enclosing type.

use std::sync::Arc;

use crate::base::{FileUri, Position};

use super::symbols::{Definition, ItemDetail, Parent, SymbolItem, SymbolKind};

/// The innermost function and the innermost enum struct or methodmap
/// whose declarations contain a position.
#[derive(Clone, Debug, Default)]
pub struct ScopeContext {
    pub function: Option<Arc<SymbolItem>>,
    pub container: Option<Arc<SymbolItem>>,
}

impl ScopeContext {
    /// Find the context of `pos` in `uri` among `items`.
    pub fn at(items: &[Arc<SymbolItem>], uri: &FileUri, pos: Position) -> Self {
        let mut context = ScopeContext::default();
        for item in items.iter().filter(|i| &i.file == uri && i.full_range.contains(pos)) {
            let slot = match item.kind() {
                SymbolKind::Function | SymbolKind::Method | SymbolKind::Constructor => {
                    // Natives and forwards have no body to be inside of.
                    if matches!(
                        &item.detail,
                        ItemDetail::Function { definition, .. } if *definition != Definition::Body
                    ) {
                        continue;
                    }
                    &mut context.function
                }
                SymbolKind::EnumStruct | SymbolKind::Methodmap => &mut context.container,
                _ => continue,
            };
            let innermost = slot
                .as_ref()
                .is_none_or(|current| item.full_range.size_hint() < current.full_range.size_hint());
            if innermost {
                *slot = Some(item.clone());
            }
        }
        context
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function.as_deref().map(|f| f.name.as_str())
    }

    pub fn container_name(&self) -> Option<&str> {
        self.container.as_deref().map(|c| c.name.as_str())
    }

    /// Whether `item` is a local (or parameter) of the enclosing function.
    pub fn is_local(&self, item: &SymbolItem) -> bool {
        let Some(function) = self.function.as_deref() else {
            return false;
        };
        item.file == function.file
            && item.parent.is(&function.name)
            && !item.kind().is_member_or_function()
            && function.full_range.contains(item.range.start)
    }

    /// Whether `item` is a member of the enclosing enum struct or methodmap.
    pub fn is_own_member(&self, item: &SymbolItem) -> bool {
        match self.container_name() {
            Some(container) => item.kind().is_member() && item.parent.is(container),
            None => false,
        }
    }

    pub fn is_global(&self) -> bool {
        self.function.is_none() && self.container.is_none()
    }

    /// The parent scope an item declared here would get.
    pub fn parent(&self) -> Parent {
        match self.function_name().or_else(|| self.container_name()) {
            Some(name) => Parent::scope(name),
            None => Parent::Global,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::parse;

    fn items(text: &str) -> Vec<Arc<SymbolItem>> {
        parse(text).items().cloned().collect()
    }

    #[test]
    fn test_innermost_function_and_container() {
        let items = items(
            "enum struct Point {\n\
             \x20   int x;\n\
             \x20   int Get() {\n\
             \x20       int y;\n\
             \x20       return this.x;\n\
             \x20   }\n\
             }\n\
             void F() {\n\
             }\n",
        );
        let uri = FileUri::from("file:///test.sp");

        let inside = ScopeContext::at(&items, &uri, Position::new(4, 10));
        assert_eq!(inside.function_name(), Some("Get"));
        assert_eq!(inside.container_name(), Some("Point"));
        let y = items.iter().find(|i| i.name == "y").unwrap();
        assert!(inside.is_local(y));
        let x = items.iter().find(|i| i.name == "x").unwrap();
        assert!(inside.is_own_member(x));
        assert!(!inside.is_local(x));

        let field = ScopeContext::at(&items, &uri, Position::new(1, 8));
        assert_eq!(field.function_name(), None);
        assert_eq!(field.container_name(), Some("Point"));

        let free = ScopeContext::at(&items, &uri, Position::new(7, 9));
        assert_eq!(free.function_name(), Some("F"));
        assert_eq!(free.container_name(), None);

        assert!(ScopeContext::at(&items, &uri, Position::new(9, 0)).is_global());
    }

    #[test]
    fn test_other_file_is_ignored() {
        let items = items("void F() {\n    int a;\n}\n");
        let other = FileUri::from("file:///other.sp");
        assert!(ScopeContext::at(&items, &other, Position::new(1, 4)).is_global());
    }
}
