//! Security pattern registry — credential material, dynamic code execution,
//! injection sinks, weak crypto.
//!
//! The credential regexes mirror the never-expose patterns used at the policy
//! layer; any rule in the secret/credential class reports `Critical`
//! regardless of context, since an exposed credential is maximal risk.

use regex::Regex;

use super::{CheckMatch, Detection, PatternRegistry, PatternRule};
use crate::review::model::Severity;

pub fn registry() -> PatternRegistry {
    PatternRegistry {
        name: "security",
        rules: vec![
            PatternRule {
                id: "sec-hardcoded-credential",
                name: "hardcoded credential",
                severity: Severity::Critical,
                description: "Hardcoded credential assigned to a variable or config key",
                fix: Some("Load secrets from environment variables or a secrets manager"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(
                        r#"(?i)(password|passwd|secret|token|api_key|apikey|auth_key|private_key)\s*[:=]\s*["'][^"']{6,}["']"#,
                    )
                    .expect("regex: hardcoded credential"),
                ),
            },
            PatternRule {
                id: "sec-api-key-literal",
                name: "API key literal",
                severity: Severity::Critical,
                description: "Provider API key or access token committed in source",
                fix: Some("Revoke the key, then load it from the environment"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(
                        r"sk-[A-Za-z0-9\-_]{20,}|ghp_[A-Za-z0-9]{36}|github_pat_[A-Za-z0-9_]{82}|AKIA[0-9A-Z]{16}",
                    )
                    .expect("regex: api key literal"),
                ),
            },
            PatternRule {
                id: "sec-private-key",
                name: "private key material",
                severity: Severity::Critical,
                description: "PEM private key block embedded in source",
                fix: Some("Remove the key and rotate it; keys belong in a keystore"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(r"-----BEGIN\s+(?:RSA |EC |OPENSSH )?PRIVATE KEY-----")
                        .expect("regex: pem header"),
                ),
            },
            PatternRule {
                id: "sec-high-entropy-string",
                name: "high-entropy string",
                severity: Severity::Critical,
                description: "High-entropy token that looks like a secret",
                fix: Some("If this is a credential, rotate it and load it from the environment"),
                category: "security",
                detection: Detection::Check(check_high_entropy),
            },
            PatternRule {
                id: "sec-eval",
                name: "eval usage",
                severity: Severity::High,
                description: "eval() executes arbitrary strings as code",
                fix: Some("Parse the input instead of evaluating it"),
                category: "security",
                detection: Detection::Regex(Regex::new(r"\beval\s*\(").expect("regex: eval")),
            },
            PatternRule {
                id: "sec-new-function",
                name: "Function constructor",
                severity: Severity::High,
                description: "new Function() is eval in disguise",
                fix: Some("Replace dynamic code construction with a dispatch table"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(r"new\s+Function\s*\(").expect("regex: function ctor"),
                ),
            },
            PatternRule {
                id: "sec-shell-interpolation",
                name: "shell command interpolation",
                severity: Severity::High,
                description: "Untrusted interpolation into a shell command",
                fix: Some("Pass arguments as an array instead of building a command string"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(r"(?:exec|execSync|spawn|spawnSync)\s*\(\s*`[^`]*\$\{")
                        .expect("regex: shell interpolation"),
                ),
            },
            PatternRule {
                id: "sec-sql-concat",
                name: "SQL string concatenation",
                severity: Severity::High,
                description: "SQL statement built by string concatenation",
                fix: Some("Use parameterized queries"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(r#"(?i)["'](?:SELECT|INSERT|UPDATE|DELETE)\b[^"']*["']\s*\+"#)
                        .expect("regex: sql concat"),
                ),
            },
            PatternRule {
                id: "sec-weak-hash",
                name: "weak hash algorithm",
                severity: Severity::Medium,
                description: "MD5/SHA-1 are broken for security purposes",
                fix: Some("Use SHA-256 or stronger"),
                category: "security",
                detection: Detection::Regex(
                    Regex::new(r#"createHash\(\s*["'](?:md5|sha1)["']"#).expect("regex: weak hash"),
                ),
            },
            PatternRule {
                id: "sec-insecure-http",
                name: "cleartext HTTP endpoint",
                severity: Severity::Medium,
                description: "Cleartext http:// endpoint",
                fix: Some("Use https://"),
                category: "security",
                detection: Detection::Check(check_insecure_http),
            },
        ],
    }
}

// ─── Check rules ──────────────────────────────────────────────────────────────

/// Flag `http://` URLs, except loopback and documentation placeholders.
///
/// The regex crate has no lookahead, so the allowlist lives here instead of
/// in the pattern.
fn check_insecure_http(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    const ALLOWED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "example.com"];

    let mut hits = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for (pos, _) in line.match_indices("http://") {
            let rest = &line[pos + "http://".len()..];
            if ALLOWED_HOSTS.iter().any(|h| rest.starts_with(h)) {
                continue;
            }
            hits.push(CheckMatch {
                message: "Cleartext http:// endpoint — credentials and data travel unencrypted"
                    .to_string(),
                line: (idx + 1) as u32,
            });
        }
    }
    Ok(hits)
}

/// Flag tokens of 20+ characters whose Shannon entropy exceeds 4.5 bits/char.
///
/// Random tokens and base64-encoded secrets have significantly higher entropy
/// than identifiers or natural language.
fn check_high_entropy(content: &str) -> anyhow::Result<Vec<CheckMatch>> {
    let mut hits = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for word in line.split_whitespace() {
            let token = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '+' && c != '/');
            if token.len() >= 20 && is_high_entropy(token) {
                let preview: String = token.chars().take(4).collect();
                hits.push(CheckMatch {
                    message: format!("High-entropy token {preview}... looks like a secret"),
                    line: (idx + 1) as u32,
                });
            }
        }
    }
    Ok(hits)
}

/// Shannon entropy over bytes, > 4.5 bits/char.
fn is_high_entropy(s: &str) -> bool {
    let mut freq = [0u32; 256];
    let len = s.len() as f64;
    for b in s.bytes() {
        freq[b as usize] += 1;
    }
    let entropy: f64 = freq
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum();
    entropy > 4.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::evaluate;

    #[test]
    fn hardcoded_password_is_critical_security_finding() {
        let content = r#"const password = "hardcoded-password-123";"#;
        let findings = evaluate(&registry(), content, "config.js");
        let hit = findings
            .iter()
            .find(|f| f.rule == "sec-hardcoded-credential")
            .expect("credential rule should fire");
        assert_eq!(hit.severity, Severity::Critical);
        assert_eq!(hit.category, "security");
        assert_eq!(hit.line, 1);
    }

    #[test]
    fn api_key_literal_detected() {
        let content = "const key = 'sk-abcdefghijklmnopqrstuvwxyz123456';";
        let findings = evaluate(&registry(), content, "main.ts");
        assert!(findings.iter().any(|f| f.rule == "sec-api-key-literal"));
    }

    #[test]
    fn insecure_http_skips_localhost() {
        let content = "fetch('http://localhost:4300/x')\nfetch('http://api.example.org/y')\n";
        let findings = evaluate(&registry(), content, "client.js");
        let hits: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == "sec-insecure-http")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);
    }

    #[test]
    fn high_entropy_token_flagged() {
        // All-distinct characters push entropy past the 4.5 threshold.
        let content = "token = aB3dE5gH7jK9mN1pQ2sT4vW6xZ8\n";
        let findings = evaluate(&registry(), content, "env.txt");
        assert!(findings.iter().any(|f| f.rule == "sec-high-entropy-string"));
    }

    #[test]
    fn natural_language_is_not_high_entropy() {
        assert!(!is_high_entropy("hello world this is text"));
    }

    #[test]
    fn clean_source_produces_no_findings() {
        let content = "fn main() { println!(\"hello\"); }\n";
        let findings = evaluate(&registry(), content, "main.rs");
        assert!(findings.is_empty(), "unexpected: {findings:?}");
    }
}
