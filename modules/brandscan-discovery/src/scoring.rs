use std::sync::LazyLock;

use regex::Regex;

const IGNORED_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".jpg", ".jpeg", ".png", ".gif", ".docx", ".xlsx", ".pptx", ".mp3", ".mp4",
];

const LANGUAGE_NAMES: &[&str] = &[
    "english", "español", "deutsch", "français", "português", "en", "es", "de", "fr", "pt",
];

static CRITICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(brand|purpose|values|strategy|products|services|operations)\b").unwrap());

static HIGH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)company|about|story|mission|vision|culture|who[-_]we[-_]are|what[-_]we[-_]do|investors?").unwrap()
});

static MEDIUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)solutions|pipeline|research|innovation|capabilities|industries|technology").unwrap()
});

static LOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)leadership|team|management|history|sustainability|responsibility|esg").unwrap()
});

static LANGUAGE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/en/|lang=en").unwrap());

/// Same shape as the reference's `NEGATIVE_REGEX` list: one compiled
/// pattern per category, any match vetoes the link to -50.
static NEGATIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(log(in|out)?|sign(in|up)|register|account|my-account)\b",
        r"(?i)\b(anmelden|abmelden|registrieren|konto)\b",
        r"(?i)\b(iniciar-sesion|cerrar-sesion|crear-cuenta|cuenta)\b",
        r"(?i)\b(impressum|imprint|legal|disclaimer|compliance|datenschutz|data-protection|privacy|terms|cookies?|policy|governance|bylaws|tax[-_]strategy)\b",
        r"(?i)\b(agb|bedingungen|rechtliches|politica-de-privacidad|aviso-legal|terminos|condiciones)\b",
        r"(?i)\b(newsletter|subscribe|subscription|unsubscribe|boletin|suscripcion|darse-de-baja)\b",
        r"(?i)\b(jobs?|career(s)?|vacancies|internships?|apply|karriere|stellenangebote|bewerbung|praktikum|empleo|trabajo|vacantes|postulaciones|reclutamiento)\b",
        r"(?i)\b(basket|cart|checkout|shop|store|ecommerce|wishlist|warenkorb|kaufen|bestellen|einkaufen|carrito|tienda|comprar|pago|pedido)\b",
        r"(?i)\b(calculator|tool|search|filter|compare|rechner|suche|vergleich|calculadora|buscar|comparar|filtro)\b",
        r"(?i)\b(404|not-found|error|redirect|sitemap|robots|tracking|rss|weiterleitung|umleitung|redireccion|mapa-del_sitio|seguimiento)\b",
        r"(?i)\b(faq(s)?|help|support|contact|customer[-_]service|knowledge[-_]base)\b",
        r"(?i)\b(api|developer(s)?|sdk|docs|documentation|partner(s)?|supplier(s)?|vendor(s)?|affiliate(s)?|portal)\b",
        r"(?i)\b(locations?|store[-_]finder|dealer[-_]locator|find[-_]a[-_]store)\b",
        r"(?i)\b(gallery|media[-_]kit|brand[-_]assets)\b",
        r"(?i)\b(accessibility|wcag)\b",
        r"(?i)\b(press[-_]release(s)?)\b",
        r"(?i)\b(news|events|blogs?|articles?|updates?|media|press|spotlight|stories)\b",
        r"(?i)\b(whitepapers?|webinars?|case[-_]stud(y|ies)|customer[-_]stor(y|ies))\b",
        r"(?i)\b(resources?|insights?|downloads?)\b",
        r"(?i)\b(takeover|capital[-_]increase|webcast|publication|report|finances?|annual[-_]report|quarterly[-_]report|balance[-_]sheet|proxy|prospectus|statement|filings|investor[-_]deck|shareholder(s)?|stock|sec[-_]filing(s)?|financials?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Score a `(link_url, anchor_text)` pair per the reference tier table.
/// Highest matching tier in Critical → High → Medium → Low order wins
/// (tiers don't stack); language/shallow-path bonuses and the negative
/// veto stack on top of whichever tier matched, or 0 if none did.
pub fn score_link(link_url: &str, link_text: &str) -> i32 {
    let lower_text = link_text.to_lowercase();
    let combined = format!("{link_url} {lower_text}");

    let mut score = 0;

    if LANGUAGE_NAMES.contains(&lower_text.as_str()) {
        score -= 20;
    }

    if CRITICAL_RE.is_match(&combined) {
        score += 30;
    } else if HIGH_RE.is_match(&combined) {
        score += 20;
    } else if MEDIUM_RE.is_match(&combined) {
        score += 10;
    } else if LOW_RE.is_match(&combined) {
        score += 5;
    }

    if LANGUAGE_PATH_RE.is_match(&combined) {
        score += 10;
    }

    let path_depth = link_url.matches('/').count() as i64 - 2;
    if path_depth <= 2 {
        score += 5;
    }

    if NEGATIVE_PATTERNS.iter().any(|re| re.is_match(&combined)) {
        score -= 50;
    }

    let lower_url = link_url.to_lowercase();
    if IGNORED_EXTENSIONS.iter().any(|ext| lower_url.ends_with(ext)) {
        score -= 100;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_tier_outscores_high_tier() {
        let critical = score_link("https://example.com/brand-strategy", "Brand Strategy");
        let high = score_link("https://example.com/about", "About us");
        assert!(critical > high);
    }

    #[test]
    fn negative_veto_dominates_tier_match() {
        let score = score_link("https://example.com/careers/about-the-team", "Careers");
        assert!(score < 0);
    }

    #[test]
    fn non_html_extension_is_heavily_penalized() {
        let score = score_link("https://example.com/brochure.pdf", "Brand Strategy");
        assert!(score < 0);
    }

    #[test]
    fn bare_language_label_is_penalized() {
        assert_eq!(score_link("https://example.com/en/", "en"), -20 + 5 + 10);
    }

    #[test]
    fn shallow_path_gets_small_bonus() {
        let shallow = score_link("https://example.com/about", "About");
        let deep = score_link("https://example.com/a/b/c/d/about", "About");
        assert!(shallow > deep);
    }
}
