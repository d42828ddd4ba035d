use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Four dot-separated numbers that don't start in the middle of a longer run of digits.
regex!(SYMBOL_REGEX, r"(?:^|\D)(\d+\.\d+\.\d+\.\d+)");
regex!(NON_WORD_REGEX, r"\W+");

/// Optional prefixes written in front of a symbol: `nr 4.11.1.3`, `v4.11.1.3`, `v 4.11.1.3`.
pub(crate) const SYMBOL_PREFIX: &str = r"(?:nr\s+|v\s*)?";
