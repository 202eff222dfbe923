//! Advisory detection of constructs the simulation does not model.
//!
//! This is a plain-text scan over the raw source, so it can fire on matches
//! inside comments or strings. Warnings never change the simulation.

use super::AnalyzerWarning;
use fancy_regex::Regex;
use log::warn;

const UNSUPPORTED: &[(&str, &str)] = &[
    (
        r"Promise\.(all|race|any|allSettled)\s*\(",
        "Promise.all/race/any/allSettled treated as immediate resolution",
    ),
    (r"\.catch\s*\(", "Error handling (.catch) not simulated"),
    (r"Promise\.reject", "Promise.reject not simulated"),
    (r"try\s*\{", "try/catch blocks not simulated for error flow"),
    (r"for\s+await", "for-await loops not supported"),
    (r"setInterval\s*\(", "setInterval shows only first iteration"),
    (r"fetch\s*\(", "fetch() treated as immediate resolution"),
];

/// One warning per pattern that matches, carrying the 1-based line of its
/// first match
pub fn detect_unsupported(source: &str) -> Vec<AnalyzerWarning> {
    let mut warnings = Vec::new();
    for (pattern, message) in UNSUPPORTED {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        if let Ok(Some(found)) = regex.find(source) {
            let line = source[..found.start()].matches('\n').count() + 1;
            warn!("unsupported construct at line {}: {}", line, message);
            warnings.push(AnalyzerWarning {
                message: message.to_string(),
                line: Some(line),
            });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        for (pattern, _) in UNSUPPORTED {
            assert!(Regex::new(pattern).is_ok(), "bad pattern {}", pattern);
        }
    }

    #[test]
    fn test_detects_with_line() {
        let warnings = detect_unsupported("console.log(1);\nPromise.all([a, b]);\nfetch('/x');");
        let found: Vec<_> = warnings
            .iter()
            .map(|w| (w.message.as_str(), w.line))
            .collect();
        assert_eq!(
            found,
            vec![
                (
                    "Promise.all/race/any/allSettled treated as immediate resolution",
                    Some(2)
                ),
                ("fetch() treated as immediate resolution", Some(3)),
            ]
        );
    }

    #[test]
    fn test_clean_source_has_no_warnings() {
        assert!(detect_unsupported("setTimeout(() => console.log('x'), 0);").is_empty());
    }

    #[test]
    fn test_catch_and_try() {
        let warnings = detect_unsupported("try {\n  p.catch(e => e);\n} finally {}");
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].message, "Error handling (.catch) not simulated");
        assert_eq!(warnings[0].line, Some(2));
        assert_eq!(warnings[1].line, Some(1));
    }
}
