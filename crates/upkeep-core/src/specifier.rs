use std::fmt;

use semver::{Version, VersionReq};

/// A caller-supplied version specifier, classified in a fixed order:
/// exact version, then range, then registry dist-tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    Exact(Version),
    Range(SpecRange),
    Tag(String),
}

impl VersionSpecifier {
    #[must_use]
    pub fn classify(specifier: &str) -> Self {
        if let Some(version) = parse_exact(specifier) {
            return Self::Exact(version);
        }
        if let Some(range) = SpecRange::parse(specifier) {
            return Self::Range(range);
        }
        Self::Tag(specifier.trim().to_string())
    }

    #[must_use]
    pub fn kind(&self) -> SpecifierKind {
        match self {
            Self::Exact(_) => SpecifierKind::Exact,
            Self::Range(_) => SpecifierKind::Range,
            Self::Tag(_) => SpecifierKind::Tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Exact,
    Range,
    Tag,
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Range => write!(f, "range"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Parse a concrete semantic version, accepting surrounding whitespace and a
/// leading `v` the way npm does.
#[must_use]
pub fn parse_exact(input: &str) -> Option<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Caret range implied by an installed version (`3.0.0` -> `^3.0.0`).
/// Non-exact inputs are returned as-is.
#[must_use]
pub fn implied_range(installed: &str) -> String {
    match parse_exact(installed) {
        Some(version) => format!("^{version}"),
        None => installed.to_string(),
    }
}

/// An npm-style range: one or more `||`-separated comparator sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl SpecRange {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let alternatives = input
            .split("||")
            .map(|set| normalize_comparator_set(set).and_then(|req| VersionReq::parse(&req).ok()))
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            raw: input.trim().to_string(),
            alternatives,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn max_satisfying<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions
            .into_iter()
            .filter(|version| self.matches(version))
            .max()
    }
}

impl fmt::Display for SpecRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Rewrite one npm comparator set into `VersionReq` syntax, or `None` if a
/// comparator is malformed.
fn normalize_comparator_set(set: &str) -> Option<String> {
    let set = set.trim();
    if set.is_empty() {
        return Some("*".to_string());
    }

    if let Some((lower, upper)) = set.split_once(" - ") {
        return Some(format!(
            "{}, {}",
            normalize_comparator(&format!(">={}", lower.trim()))?,
            normalize_comparator(&format!("<={}", upper.trim()))?
        ));
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in set.split_whitespace() {
        if token.chars().all(is_operator_char) {
            pending_op = Some(token);
            continue;
        }
        let comparator = match pending_op.take() {
            Some(op) => format!("{op}{token}"),
            None => token.to_string(),
        };
        comparators.push(normalize_comparator(&comparator)?);
    }
    if let Some(op) = pending_op {
        // Dangling operator; let `VersionReq` reject it.
        comparators.push(op.to_string());
    }

    Some(comparators.join(", "))
}

fn normalize_comparator(comparator: &str) -> Option<String> {
    let split = comparator
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);
    let op = match op {
        "" => "=",
        "~>" => "~",
        other => other,
    };
    let version = version.strip_prefix('v').unwrap_or(version);

    // `x`, `X` and `*` mean "anything from here on" and may only trail.
    let parts: Vec<&str> = version.split('.').collect();
    let Some(first_wildcard) = parts.iter().position(|part| is_wildcard(part)) else {
        return Some(format!("{op}{version}"));
    };
    if parts.len() > 3 || !parts[first_wildcard..].iter().all(|part| is_wildcard(part)) {
        return None;
    }
    if first_wildcard == 0 {
        return Some("*".to_string());
    }

    Some(format!("{op}{}", parts[..first_wildcard].join(".")))
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}
