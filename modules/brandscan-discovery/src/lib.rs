//! Link discovery (HTML anchors + sitemap), scoring, and novelty-based
//! page selection.

pub mod link;
pub mod portal;
pub mod scoring;
pub mod selection;
pub mod sitemap;
pub mod url_norm;

pub use link::discover_links_from_html;
pub use portal::find_portal_pivot;
pub use scoring::score_link;
pub use selection::{select_pages, shingle_set, Candidate, SelectionParams};
pub use sitemap::discover_links_from_sitemap;
pub use url_norm::{is_same_root_word_domain, normalize_url, root_word};
