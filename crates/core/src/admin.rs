//! Admin screen controller: category table view model, run form submission
//! and screen options. Rendering is left to the hosting page framework.

use crate::application::CleanupService;
use crate::domain::{CategoryRecord, CleanupRequest, TermId};
use crate::error::{Result, ToolsetError};
use crate::ports::{AccessPolicy, SettingsStore, UserId};
use crate::settings::{DisplayColumn, ScreenOptions, OPTION_KEY_PER_PAGE};
use std::fmt;
use tracing::info;

pub const ADMIN_SLUG: &str = "store-toolset";
pub const NONCE_ACTION: &str = "store_toolset_run_nonce";
pub const SCREEN_OPTIONS_NONCE_ACTION: &str = "screen-options-nonce";

/// Status flag carried by the redirect after a form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    NoTerms,
    Done,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NoTerms => f.write_str("no_terms"),
            RunStatus::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub page: &'static str,
    pub status: RunStatus,
}

impl Redirect {
    /// Query string for the admin page, e.g. `page=store-toolset&store_toolset_msg=done`
    pub fn query(&self) -> String {
        format!("page={}&store_toolset_msg={}", self.page, self.status)
    }
}

/// Posted run form
#[derive(Debug, Clone, Default)]
pub struct RunForm {
    pub nonce: String,
    pub term_ids: Vec<String>,
    pub dry_run: bool,
}

/// Posted screen options form
#[derive(Debug, Clone, Default)]
pub struct ScreenOptionsForm {
    pub nonce: String,
    pub option: Option<String>,
    pub columns: Vec<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub term_id: TermId,
    pub name: String,
    pub slug: Option<String>,
    pub count: Option<u64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CategoryRow {
    fn from_record(record: CategoryRecord, options: &ScreenOptions) -> Self {
        Self {
            term_id: record.term_id,
            name: record.name,
            slug: options.shows(DisplayColumn::Slug).then_some(record.slug),
            count: options.shows(DisplayColumn::Count).then_some(record.count),
            description: options
                .shows(DisplayColumn::Description)
                .then_some(record.description),
            image: if options.shows(DisplayColumn::Image) {
                record.image
            } else {
                None
            },
        }
    }
}

/// Everything the admin page needs to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPage {
    pub slug: &'static str,
    pub rows: Vec<CategoryRow>,
    pub options: ScreenOptions,
    pub dry_run_default: bool,
    pub last_log: Option<String>,
}

pub struct AdminController<'a> {
    service: &'a CleanupService<'a>,
    settings: &'a dyn SettingsStore,
    access: &'a dyn AccessPolicy,
}

impl<'a> AdminController<'a> {
    pub fn new(
        service: &'a CleanupService<'a>,
        settings: &'a dyn SettingsStore,
        access: &'a dyn AccessPolicy,
    ) -> Self {
        Self {
            service,
            settings,
            access,
        }
    }

    pub fn render_page(&self, user: UserId) -> Result<AdminPage> {
        self.require_manager(user, "access this page")?;

        let options = ScreenOptions::load(self.settings, user)?;
        let rows = self
            .service
            .list_categories()?
            .into_iter()
            .map(|record| CategoryRow::from_record(record, &options))
            .collect();

        Ok(AdminPage {
            slug: ADMIN_SLUG,
            rows,
            options,
            dry_run_default: true,
            last_log: self.service.last_log()?,
        })
    }

    pub fn handle_submission(&self, user: UserId, form: &RunForm) -> Result<Redirect> {
        self.require_manager(user, "do this")?;
        if !self.access.verify_token(NONCE_ACTION, &form.nonce) {
            return Err(ToolsetError::PermissionDenied(
                "the link you followed has expired".to_string(),
            ));
        }

        let term_ids: Vec<TermId> = form
            .term_ids
            .iter()
            .filter_map(|raw| raw.trim().parse::<TermId>().ok())
            .collect();

        let request = match CleanupRequest::new(term_ids, form.dry_run) {
            Ok(request) => request,
            Err(ToolsetError::InvalidInput(_)) => {
                return Ok(Redirect {
                    page: ADMIN_SLUG,
                    status: RunStatus::NoTerms,
                })
            }
            Err(e) => return Err(e),
        };

        info!(user, "Cleanup submitted from admin screen");
        self.service.run(&request)?;

        Ok(Redirect {
            page: ADMIN_SLUG,
            status: RunStatus::Done,
        })
    }

    /// Returns `Ok(None)` when the form is not ours or the user may not save it.
    pub fn save_screen_options(
        &self,
        user: UserId,
        form: &ScreenOptionsForm,
    ) -> Result<Option<ScreenOptions>> {
        if form.option.as_deref() != Some(OPTION_KEY_PER_PAGE) || !self.access.can_manage(user) {
            return Ok(None);
        }
        if !self
            .access
            .verify_token(SCREEN_OPTIONS_NONCE_ACTION, &form.nonce)
        {
            return Err(ToolsetError::PermissionDenied(
                "the link you followed has expired".to_string(),
            ));
        }

        let options = ScreenOptions::from_posted(&form.columns, form.per_page.as_deref());
        options.save(self.settings, user)?;
        Ok(Some(options))
    }

    fn require_manager(&self, user: UserId, what: &str) -> Result<()> {
        if self.access.can_manage(user) {
            Ok(())
        } else {
            Err(ToolsetError::PermissionDenied(format!(
                "Sorry, you are not allowed to {what}."
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use crate::runlog::LAST_LOG_KEY;

    const ADMIN: UserId = 1;
    const SHOP_MANAGER: UserId = 2;
    const SUBSCRIBER: UserId = 9;

    struct Fixture {
        store: FakeStore,
        archive: FakeArchive,
        cache: FakeCache,
        clock: FakeClock,
        settings: FakeSettings,
        access: FakeAccess,
    }

    impl Fixture {
        fn new() -> Self {
            let store = FakeStore::default()
                .with_category(category(12, "Shoes", 3), vec![101, 102, 103])
                .with_category(category(7, "Hats", 0), vec![]);
            Self {
                store,
                archive: FakeArchive::default(),
                cache: FakeCache::default(),
                clock: FakeClock::default(),
                settings: FakeSettings::default(),
                access: FakeAccess {
                    managers: [ADMIN, SHOP_MANAGER].into_iter().collect(),
                },
            }
        }

        fn service(&self) -> CleanupService<'_> {
            CleanupService::new(
                &self.store,
                &self.store,
                &self.archive,
                &self.cache,
                &self.clock,
            )
        }
    }

    fn run_form(ids: &[&str], dry_run: bool) -> RunForm {
        RunForm {
            nonce: "valid".to_string(),
            term_ids: ids.iter().map(|s| s.to_string()).collect(),
            dry_run,
        }
    }

    #[test]
    fn test_render_page_requires_capability() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);

        assert!(matches!(
            admin.render_page(SUBSCRIBER),
            Err(ToolsetError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_render_page_lists_categories_with_chosen_columns() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);
        ScreenOptions {
            columns: vec![DisplayColumn::Slug],
            per_page: 50,
        }
        .save(&fixture.settings, ADMIN)
        .unwrap();

        let page = admin.render_page(ADMIN).unwrap();

        assert_eq!(page.slug, "store-toolset");
        assert!(page.dry_run_default);
        assert_eq!(page.options.per_page, 50);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].slug.as_deref(), Some("shoes"));
        assert_eq!(page.rows[0].count, None);
        assert_eq!(page.rows[0].description, None);
        assert_eq!(page.last_log, None);
    }

    #[test]
    fn test_submission_runs_and_page_shows_last_log() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);

        let redirect = admin
            .handle_submission(SHOP_MANAGER, &run_form(&["12", "999"], true))
            .unwrap();

        assert_eq!(redirect.status, RunStatus::Done);
        assert_eq!(redirect.query(), "page=store-toolset&store_toolset_msg=done");
        let last_log = admin.render_page(SHOP_MANAGER).unwrap().last_log.unwrap();
        assert!(last_log.contains("Products found: 3 (dry run, no deletions)"));
        assert!(last_log.contains("Invalid category identifier: 999"));
        assert!(fixture.store.deleted.borrow().is_empty());
    }

    #[test]
    fn test_live_submission_deletes() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);

        admin
            .handle_submission(ADMIN, &run_form(&["12"], false))
            .unwrap();

        assert_eq!(*fixture.store.deleted.borrow(), vec![101, 102, 103]);
    }

    #[test]
    fn test_submission_without_ids_redirects_no_terms() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);

        let redirect = admin
            .handle_submission(ADMIN, &run_form(&["", "0", "abc"], false))
            .unwrap();

        assert_eq!(redirect.status, RunStatus::NoTerms);
        assert!(fixture.archive.written.borrow().is_empty());
        assert!(!fixture.cache.entries.borrow().contains_key(LAST_LOG_KEY));
    }

    #[test]
    fn test_submission_rejects_bad_token_and_missing_capability() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);
        let mut forged = run_form(&["12"], false);
        forged.nonce = "stale".to_string();

        assert!(matches!(
            admin.handle_submission(ADMIN, &forged),
            Err(ToolsetError::PermissionDenied(_))
        ));
        assert!(matches!(
            admin.handle_submission(SUBSCRIBER, &run_form(&["12"], false)),
            Err(ToolsetError::PermissionDenied(_))
        ));
        assert!(fixture.store.deleted.borrow().is_empty());
        assert!(fixture.store.enumerations.borrow().is_empty());
    }

    #[test]
    fn test_save_screen_options_validates_and_clamps() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);
        let form = ScreenOptionsForm {
            nonce: "valid".to_string(),
            option: Some(OPTION_KEY_PER_PAGE.to_string()),
            columns: vec!["image".to_string(), "price".to_string()],
            per_page: Some("5000".to_string()),
        };

        let saved = admin.save_screen_options(ADMIN, &form).unwrap().unwrap();

        assert_eq!(saved.columns, vec![DisplayColumn::Image]);
        assert_eq!(saved.per_page, 200);
        assert_eq!(ScreenOptions::load(&fixture.settings, ADMIN).unwrap(), saved);
    }

    #[test]
    fn test_save_screen_options_ignores_foreign_forms_and_users() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let admin = AdminController::new(&service, &fixture.settings, &fixture.access);
        let mut form = ScreenOptionsForm {
            nonce: "valid".to_string(),
            option: Some("edit_post_per_page".to_string()),
            columns: vec!["slug".to_string()],
            per_page: Some("30".to_string()),
        };

        assert_eq!(admin.save_screen_options(ADMIN, &form).unwrap(), None);
        form.option = Some(OPTION_KEY_PER_PAGE.to_string());
        assert_eq!(admin.save_screen_options(SUBSCRIBER, &form).unwrap(), None);
        assert!(fixture.settings.values.borrow().is_empty());

        form.nonce = "stale".to_string();
        assert!(matches!(
            admin.save_screen_options(ADMIN, &form),
            Err(ToolsetError::PermissionDenied(_))
        ));
    }
}
