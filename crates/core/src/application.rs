use crate::config::DEFAULT_CACHE_TTL;
use crate::domain::{
    CategoryOutcome, CategoryRecord, CategoryRef, CleanupRequest, ProductId, RunLog, TermId,
};
use crate::error::{Result, ToolsetError};
use crate::ports::{CategoryRepository, Clock, LogArchive, LogCache, ProductRepository};
use crate::runlog::{assemble, LAST_LOG_KEY};
use crate::utils::{parse_id_list, split_list};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Application service running category cleanups against the injected ports
pub struct CleanupService<'a> {
    categories: &'a dyn CategoryRepository,
    products: &'a dyn ProductRepository,
    archive: &'a dyn LogArchive,
    cache: &'a dyn LogCache,
    clock: &'a dyn Clock,
    cache_ttl: Duration,
}

impl<'a> CleanupService<'a> {
    /// Creates a new CleanupService with the given dependencies
    pub fn new(
        categories: &'a dyn CategoryRepository,
        products: &'a dyn ProductRepository,
        archive: &'a dyn LogArchive,
        cache: &'a dyn LogCache,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            categories,
            products,
            archive,
            cache,
            clock,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Resolves an id or slug to a category. Unknown categories are `Ok(None)`.
    pub fn lookup(&self, category: &CategoryRef) -> Result<Option<CategoryRecord>> {
        self.categories.get_category(category)
    }

    /// Every product assigned to the category, whatever its status.
    pub fn find_product_ids(&self, category: &CategoryRecord) -> Result<Vec<ProductId>> {
        self.products.find_ids_by_category(category.term_id, true)
    }

    /// All product categories, empty ones included
    pub fn list_categories(&self) -> Result<Vec<CategoryRecord>> {
        self.categories.list_categories(true)
    }

    /// Turns `--term-id` / `--category-slug` style lists into category ids.
    /// Explicit ids win over slugs; slugs that do not resolve are skipped.
    pub fn resolve_term_ids(
        &self,
        term_ids: Option<&str>,
        slugs: Option<&str>,
    ) -> Result<Vec<TermId>> {
        let mut resolved = Vec::new();

        match (term_ids.filter(|s| !s.trim().is_empty()), slugs) {
            (Some(ids), _) => resolved = parse_id_list(ids),
            (None, Some(slugs)) => {
                for raw in split_list(slugs) {
                    let Ok(category) = CategoryRef::parse(&raw) else {
                        warn!(slug = %raw, "Skipping unusable category slug");
                        continue;
                    };
                    match self.lookup(&category)? {
                        Some(record) => resolved.push(record.term_id),
                        None => warn!(slug = %category, "Category slug not found"),
                    }
                }
            }
            (None, None) => {}
        }

        if resolved.is_empty() {
            return Err(ToolsetError::InvalidInput(
                "No valid categories provided. Use --term-id or --category-slug.".to_string(),
            ));
        }
        Ok(resolved)
    }

    /// Runs the cleanup: one outcome per requested category, then the log is
    /// archived and cached. Archive and cache failures never fail the run.
    pub fn run(&self, request: &CleanupRequest) -> Result<RunLog> {
        let started_at = self.clock.now();
        info!(
            mode = %request.mode(),
            categories = request.term_ids().len(),
            "Cleanup run started"
        );

        let mut outcomes = Vec::with_capacity(request.term_ids().len());
        for &term_id in request.term_ids() {
            let outcome = self.cleanup_category(term_id, request.dry_run());
            debug!(term_id, outcome = %outcome, "Category processed");
            outcomes.push(outcome);
        }

        let finished_at = self.clock.now();
        let text = assemble(request, &outcomes, started_at, finished_at);

        match self.archive.archive(started_at, &text) {
            Ok(path) => info!(path = %path.display(), "Run log archived"),
            Err(e) => warn!(error = %e, "Could not archive run log"),
        }
        if let Err(e) = self.cache.store(LAST_LOG_KEY, &text, self.cache_ttl) {
            warn!(error = %e, "Could not cache run log");
        }

        info!(mode = %request.mode(), "Cleanup run finished");
        Ok(RunLog {
            started_at,
            finished_at,
            mode: request.mode(),
            outcomes,
            text,
        })
    }

    /// The most recent run log, if it has not expired yet
    pub fn last_log(&self) -> Result<Option<String>> {
        self.cache.fetch(LAST_LOG_KEY)
    }

    /// Never fails: host read errors become outcome lines so the run can
    /// still assemble and keep its log.
    fn cleanup_category(&self, term_id: TermId, dry_run: bool) -> CategoryOutcome {
        let category = match self.lookup(&CategoryRef::Id(term_id)) {
            Ok(Some(category)) => category,
            Ok(None) => return CategoryOutcome::Invalid { term_id },
            Err(e) => {
                warn!(term_id, error = %e, "Category lookup failed");
                return CategoryOutcome::Invalid { term_id };
            }
        };

        let product_ids = match self.find_product_ids(&category) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(term_id, error = %e, "Product lookup failed");
                return CategoryOutcome::Unreadable {
                    name: category.name,
                    term_id,
                };
            }
        };
        let found = product_ids.len();

        if dry_run {
            return CategoryOutcome::Simulated {
                name: category.name,
                term_id,
                found,
            };
        }

        let mut deleted = 0;
        let mut failed = Vec::new();
        for product_id in product_ids {
            match self.products.delete_permanently(product_id) {
                Ok(true) => deleted += 1,
                Ok(false) => {
                    warn!(term_id, product_id, "Product was not deleted");
                    failed.push(product_id);
                }
                Err(e) => {
                    warn!(term_id, product_id, error = %e, "Product delete failed");
                    failed.push(product_id);
                }
            }
        }

        CategoryOutcome::Deleted {
            name: category.name,
            term_id,
            found,
            deleted,
            failed,
        }
    }
}
