//! `AnalysisHost`: the owned state behind every IDE query.
//!
//! The host holds the current text of each open document, the include
//! resolver and the [`ItemsRepository`]. Edits go through the host;
//! queries go through the read-only [`Analysis`] view it hands out.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::{FileUri, Location, Position};
use crate::config::EngineConfig;
use crate::hir::{
    AllItems, FileItems, ItemsRepository, PositionResolver, ResolveResult, collect_references,
    purge_references,
};
use crate::parser::Parser;
use crate::project::{FsIncludeResolver, IncludeResolver};
use crate::syntax::TextDocument;

use super::{
    CompletionItem, DocumentLink, DocumentSymbol, FoldingRange, GotoResult, HoverResult, SignatureHelp,
};

/// Owner of documents and symbol tables.
pub struct AnalysisHost {
    config: EngineConfig,
    resolver: Arc<dyn IncludeResolver>,
    documents: FxHashMap<FileUri, Arc<TextDocument>>,
    repository: Arc<ItemsRepository>,
}

impl AnalysisHost {
    /// A host resolving includes on the file system.
    pub fn new(config: EngineConfig) -> Self {
        let resolver = Arc::new(FsIncludeResolver::from_config(&config));
        Self::with_include_resolver(config, resolver)
    }

    pub fn with_include_resolver(config: EngineConfig, resolver: Arc<dyn IncludeResolver>) -> Self {
        Self {
            repository: Arc::new(ItemsRepository::new(config.clone())),
            config,
            resolver,
            documents: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<ItemsRepository> {
        &self.repository
    }

    pub fn document(&self, uri: &FileUri) -> Option<&Arc<TextDocument>> {
        self.documents.get(uri)
    }

    pub fn documents(&self) -> impl Iterator<Item = &FileUri> {
        self.documents.keys()
    }

    /// Parse `doc` as the content of `uri` without installing it.
    ///
    /// Uses of `#define`s visible through the file's includes are recorded
    /// along with the file's own.
    pub fn parse(&self, uri: &FileUri, doc: &TextDocument) -> FileItems {
        Parser::new(uri.clone(), doc, &*self.resolver, &self.config)
            .with_known_defines(self.repository.visible_defines(uri))
            .parse()
    }

    /// Replace the content of `uri` and refresh everything derived from it.
    pub fn set_file_content(&mut self, uri: FileUri, text: impl Into<Arc<str>>) {
        let doc = Arc::new(TextDocument::new(text));
        let items = self.parse(&uri, &doc);
        let count = items.len();
        self.repository.set_file_items(items);
        self.documents.insert(uri.clone(), Arc::clone(&doc));

        collect_references(&self.repository, &uri, &doc);
        // Items of the new table start with empty reference lists; files
        // that see them have to record their uses again.
        let dependents = self.dependents_of(&uri);
        for dependent in &dependents {
            self.collect(dependent);
        }
        tracing::debug!(uri = %uri, items = count, dependents = dependents.len(), "file content set");
    }

    /// Install already parsed files, then run the reference pass once for
    /// each of them.
    pub fn set_parsed_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = (Arc<TextDocument>, FileItems)>,
    {
        let mut installed = Vec::new();
        for (doc, items) in files {
            let uri = items.uri().clone();
            self.repository.set_file_items(items);
            self.documents.insert(uri.clone(), doc);
            installed.push(uri);
        }
        for uri in &installed {
            self.collect(uri);
        }
        tracing::debug!(files = installed.len(), "parsed files installed");
    }

    /// Forget `uri` and every reference it made.
    pub fn remove_file(&mut self, uri: &FileUri) {
        purge_references(&self.repository, uri);
        self.documents.remove(uri);
        self.repository.remove_file(uri);
        for dependent in self.dependents_of(uri) {
            self.collect(&dependent);
        }
    }

    /// Make queries from `uri` see the items of `main`, or undo it with `None`.
    pub fn set_main_file(&mut self, uri: FileUri, main: Option<FileUri>) {
        self.repository.set_main_file(uri.clone(), main);
        self.collect(&uri);
    }

    /// Read-only view for queries.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self }
    }

    fn collect(&self, uri: &FileUri) {
        if let Some(doc) = self.documents.get(uri) {
            collect_references(&self.repository, uri, doc);
        }
    }

    /// Open documents other than `uri` whose include closure contains it.
    fn dependents_of(&self, uri: &FileUri) -> Vec<FileUri> {
        self.documents
            .keys()
            .filter(|doc| *doc != uri && self.repository.include_closure(doc).contains(uri))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for AnalysisHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisHost")
            .field("config", &self.config)
            .field("documents", &self.documents.len())
            .field("repository", &self.repository)
            .finish()
    }
}

/// Queries against the host's current state.
///
/// Position queries on a document the host does not know return `None`
/// (or [`ResolveResult::NotApplicable`]). Positions in and out are byte
/// columns; see [`TextDocument::position_from_utf16`].
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
}

impl<'a> Analysis<'a> {
    fn with_resolver<R>(&self, uri: &FileUri, f: impl FnOnce(&PositionResolver<'_>) -> R) -> Option<R> {
        let doc = self.host.documents.get(uri)?;
        let items = self.host.repository.get_all_items(uri);
        let resolver = PositionResolver::new(uri, doc, &items).with_include_resolver(&*self.host.resolver);
        Some(f(&resolver))
    }

    pub fn resolve(&self, uri: &FileUri, pos: Position) -> ResolveResult {
        self.with_resolver(uri, |r| r.resolve(pos))
            .unwrap_or(ResolveResult::NotApplicable)
    }

    pub fn completions(&self, uri: &FileUri, pos: Position) -> Option<Vec<CompletionItem>> {
        self.with_resolver(uri, |r| super::completions(r, pos)).flatten()
    }

    pub fn hover(&self, uri: &FileUri, pos: Position) -> Option<HoverResult> {
        self.with_resolver(uri, |r| super::hover(r, pos)).flatten()
    }

    pub fn goto_definition(&self, uri: &FileUri, pos: Position) -> Option<GotoResult> {
        self.with_resolver(uri, |r| super::goto_definition(r, pos)).flatten()
    }

    pub fn signature_help(&self, uri: &FileUri, pos: Position) -> Option<SignatureHelp> {
        self.with_resolver(uri, |r| super::signature_help(r, pos)).flatten()
    }

    pub fn find_references(&self, uri: &FileUri, pos: Position, include_declaration: bool) -> Option<Vec<Location>> {
        self.with_resolver(uri, |r| super::find_references(r, pos, include_declaration))
            .flatten()
    }

    pub fn document_symbols(&self, uri: &FileUri) -> Vec<DocumentSymbol> {
        self.file_items(uri)
            .map(|file| super::document_symbols(&file))
            .unwrap_or_default()
    }

    pub fn folding_ranges(&self, uri: &FileUri) -> Vec<FoldingRange> {
        match (self.file_items(uri), self.host.documents.get(uri)) {
            (Some(file), Some(doc)) => super::folding_ranges(&file, doc),
            _ => Vec::new(),
        }
    }

    pub fn document_links(&self, uri: &FileUri) -> Vec<DocumentLink> {
        self.file_items(uri)
            .map(|file| super::document_links(&file))
            .unwrap_or_default()
    }

    pub fn file_items(&self, uri: &FileUri) -> Option<Arc<FileItems>> {
        self.host.repository.file_items(uri)
    }

    /// Every item visible from `uri`.
    pub fn all_items(&self, uri: &FileUri) -> AllItems {
        self.host.repository.get_all_items(uri)
    }
}
