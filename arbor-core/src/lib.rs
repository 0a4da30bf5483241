pub mod audit;
pub mod axe;
pub mod error;
pub mod finding;
pub mod page;
pub mod report;
pub mod site;

pub use audit::{PageAudit, SiteAudit, audit_page, audit_site, generate_sitemap};
pub use axe::{AxeGroup, AxeNode, AxeResults, CommandEvaluator, Evaluator};
pub use error::AuditError;
pub use finding::{AuditType, Finding, FindingCategory, FindingKind};
pub use page::Page;
pub use site::{Grouping, Site, SiteOptions};
