//! Pre-compiled grammars for the numeric and format validator families
//!
//! Every grammar is anchored. Letter classes list both cases explicitly, so
//! matching ignores case for ASCII letters only; Unicode case folding would
//! let characters like U+212A KELVIN SIGN pass as `k`. Note that the numeric
//! grammars use `*` quantifiers, so the empty string is accepted by
//! `integer`, `number` and friends; callers needing a non-empty value must
//! say so with `minLength` or at the model layer.

use once_cell::sync::Lazy;
use regex::Regex;

fn grammar(source: &str) -> Regex {
    Regex::new(source).expect("built-in grammar must compile")
}

// ============================================================================
// Numeric Grammars
// ============================================================================

pub static INTEGER: Lazy<Regex> = Lazy::new(|| grammar(r"^[+-]?[0-9]*$"));
pub static NEGATIVE_INTEGER: Lazy<Regex> = Lazy::new(|| grammar(r"^-[1-9][0-9]*$"));
pub static NON_NEGATIVE_INTEGER: Lazy<Regex> = Lazy::new(|| grammar(r"^[+]?[0-9]*$"));
pub static NON_POSITIVE_INTEGER: Lazy<Regex> = Lazy::new(|| grammar(r"^-[0-9]*$"));
pub static POSITIVE_INTEGER: Lazy<Regex> = Lazy::new(|| grammar(r"^[+]?[1-9][0-9]*$"));

pub static NUMBER: Lazy<Regex> = Lazy::new(|| grammar(r"^[-+]?[0-9]*\.?[0-9]*$"));
pub static NEGATIVE_NUMBER: Lazy<Regex> = Lazy::new(|| grammar(r"^-[0-9]*\.?[0-9]*$"));
pub static NON_NEGATIVE_NUMBER: Lazy<Regex> = Lazy::new(|| grammar(r"^[+]?[0-9]*\.?[0-9]*$"));
pub static NON_POSITIVE_NUMBER: Lazy<Regex> = Lazy::new(|| grammar(r"^-[0-9]*\.?[0-9]*$"));

// ============================================================================
// Format Grammars
// ============================================================================

pub static EMAIL: Lazy<Regex> =
    Lazy::new(|| grammar(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"));

/// Scheme, userinfo, host, port and path pieces shared by the URL grammars
const SCHEME: &str = r"[A-Za-z][A-Za-z0-9+.-]*://";
const USERINFO: &str = r"(?:[^\s:@/]+(?::[^\s@/]*)?@)?";
const HOST: &str = concat!(
    r"(?:(?i-u:localhost)",
    r"|(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}",
    r"|[0-9]{1,3}(?:\.[0-9]{1,3}){3})",
);
const PORT: &str = r"(?::[0-9]{1,5})?";
const REST: &str = r"(?:[/?#][^\s]*)?";

/// Optional scheme, then host and optional path
pub static URL: Lazy<Regex> = Lazy::new(|| {
    grammar(&format!("^(?:{SCHEME})?{USERINFO}{HOST}{PORT}{REST}$"))
});

/// Scheme required
pub static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| {
    grammar(&format!("^{SCHEME}{USERINFO}{HOST}{PORT}{REST}$"))
});

/// Path only, starting at a single `/`, with optional query and fragment.
/// `//host/...` carries an authority and is rejected.
pub static RELATIVE_URL: Lazy<Regex> =
    Lazy::new(|| grammar(r"^/(?:[^/\s?#][^\s?#]*)?(?:\?[^\s#]*)?(?:#[^\s]*)?$"));

const OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";

/// IPv4 dotted quad, each octet 0-255 without leading zeros
pub static IPV4: Lazy<Regex> =
    Lazy::new(|| grammar(&format!(r"^(?:{OCTET}\.){{3}}{OCTET}$")));

/// Date-only bound strings (`YYYY-MM-DD`)
pub(crate) static DATE_ONLY: Lazy<Regex> = Lazy::new(|| grammar(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"));
