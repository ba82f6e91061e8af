//! Items repository: the URI-keyed store of parsed files.
//!
//! Each file's [`FileItems`] is held behind an `Arc` and swapped whole on
//! re-parse, so a reader always sees either the old or the new table.
//! [`ItemsRepository::get_all_items`] flattens a file and everything it
//! transitively includes; results are cached per URI and dropped when any
//! file in the closure is replaced or removed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::FileUri;
use crate::config::EngineConfig;

use super::file_items::FileItems;
use super::symbols::{ItemDetail, SymbolItem};

/// Flattened items visible from one file, in include-walk order.
pub type AllItems = Arc<[Arc<SymbolItem>]>;

#[derive(Clone)]
struct Closure {
    files: IndexSet<FileUri>,
    items: AllItems,
}

/// Store of every parsed file plus main-file overrides.
#[derive(Default)]
pub struct ItemsRepository {
    config: EngineConfig,
    files: RwLock<FxHashMap<FileUri, Arc<FileItems>>>,
    main_files: RwLock<FxHashMap<FileUri, FileUri>>,
    cache: RwLock<FxHashMap<FileUri, Closure>>,
    /// Bumped on every store change; a closure computed across a bump is not cached.
    generation: AtomicU64,
}

impl ItemsRepository {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // FILES
    // ========================================================================

    /// Install the table of a freshly parsed file, replacing the previous one.
    pub fn set_file_items(&self, items: FileItems) -> Option<Arc<FileItems>> {
        let uri = items.uri().clone();
        let previous = self.files.write().insert(uri.clone(), Arc::new(items));
        self.invalidate(&uri);
        previous
    }

    pub fn remove_file(&self, uri: &FileUri) -> Option<Arc<FileItems>> {
        let removed = self.files.write().remove(uri);
        self.main_files.write().remove(uri);
        self.invalidate(uri);
        removed
    }

    pub fn file_items(&self, uri: &FileUri) -> Option<Arc<FileItems>> {
        self.files.read().get(uri).cloned()
    }

    pub fn contains(&self, uri: &FileUri) -> bool {
        self.files.read().contains_key(uri)
    }

    /// URIs of every stored file, in no particular order.
    pub fn files(&self) -> Vec<FileUri> {
        self.files.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Counter bumped whenever a file is replaced or removed.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    // ========================================================================
    // MAIN FILES
    // ========================================================================

    /// Resolve `uri` through `main` instead of itself. `None` clears it.
    pub fn set_main_file(&self, uri: FileUri, main: Option<FileUri>) {
        match main {
            Some(main) => {
                self.main_files.write().insert(uri.clone(), main);
            }
            None => {
                self.main_files.write().remove(&uri);
            }
        }
    }

    /// The file whose include closure answers queries in `uri`.
    pub fn main_file_for(&self, uri: &FileUri) -> FileUri {
        if let Some(main) = self.main_files.read().get(uri) {
            return main.clone();
        }
        self.config.main_file_for(uri).unwrap_or_else(|| uri.clone())
    }

    // ========================================================================
    // INCLUDE CLOSURE
    // ========================================================================

    /// Files reachable from `uri` (after main-file redirection) through
    /// includes, `uri` first. Cycles are walked once.
    pub fn include_closure(&self, uri: &FileUri) -> IndexSet<FileUri> {
        let root = self.main_file_for(uri);
        self.walk(root)
    }

    fn walk(&self, root: FileUri) -> IndexSet<FileUri> {
        let mut visited = IndexSet::new();
        let mut stack = vec![root];
        while let Some(uri) = stack.pop() {
            if !visited.insert(uri.clone()) {
                continue;
            }
            // Each file is read on its own; other files may change mid-walk.
            let Some(items) = self.file_items(&uri) else {
                continue;
            };
            let targets: Vec<_> = items.include_targets().cloned().collect();
            stack.extend(targets.into_iter().rev().filter(|t| !visited.contains(t)));
        }
        visited
    }

    /// Every item visible from `uri`: its own and those of its includes.
    ///
    /// Not deduplicated by name; shadowing is resolved by the caller.
    pub fn get_all_items(&self, uri: &FileUri) -> AllItems {
        let root = self.main_file_for(uri);
        if let Some(hit) = self.cache.read().get(&root) {
            tracing::trace!(uri = %root, "items cache hit");
            return hit.items.clone();
        }

        let generation = self.generation.load(Ordering::Acquire);
        let files = self.walk(root.clone());
        let items: Vec<_> = {
            let tables = self.files.read();
            files
                .iter()
                .filter_map(|uri| tables.get(uri))
                .flat_map(|table| table.items().cloned())
                .collect()
        };
        let items: AllItems = items.into();
        tracing::debug!(
            uri = %root,
            files = files.len(),
            items = items.len(),
            "flattened include closure"
        );
        let mut cache = self.cache.write();
        if self.generation.load(Ordering::Acquire) == generation {
            cache.insert(
                root,
                Closure {
                    files,
                    items: items.clone(),
                },
            );
        }
        items
    }

    /// Names of `#define`s visible from `uri`.
    pub fn visible_defines(&self, uri: &FileUri) -> FxHashSet<SmolStr> {
        self.get_all_items(uri)
            .iter()
            .filter(|item| matches!(item.detail, ItemDetail::Define { .. }))
            .map(|item| item.name.clone())
            .collect()
    }

    /// Drop every cached closure that contains `uri`.
    fn invalidate(&self, uri: &FileUri) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|root, closure| root != uri && !closure.files.contains(uri));
        let dropped = before - cache.len();
        if dropped > 0 {
            tracing::debug!(uri = %uri, dropped, "invalidated include closures");
        }
    }
}

impl std::fmt::Debug for ItemsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemsRepository")
            .field("files", &self.len())
            .field("cached", &self.cache.read().len())
            .finish()
    }
}
