//! Git ref classification and branch pattern matching

/// A classified git ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitRef<'a> {
    Branch(&'a str),
    Tag(&'a str),
    /// Fully qualified refs outside heads/tags (merge requests, notes, ...).
    Other(&'a str),
}

impl<'a> GitRef<'a> {
    /// Classify a ref string. Bare names are treated as branch names.
    pub fn parse(input: &'a str) -> GitRef<'a> {
        if let Some(name) = input.strip_prefix("refs/heads/") {
            GitRef::Branch(name)
        } else if let Some(name) = input.strip_prefix("refs/tags/") {
            GitRef::Tag(name)
        } else if input.starts_with("refs/") {
            GitRef::Other(input)
        } else {
            GitRef::Branch(input)
        }
    }

    /// The short branch name, `None` for tags and other refs.
    pub fn branch_name(&self) -> Option<&'a str> {
        match self {
            GitRef::Branch(name) => Some(name),
            _ => None,
        }
    }
}

/// Shell-glob match where `*` matches zero or more of any character,
/// including `/`. Path-aware glob semantics deliberately do not apply:
/// `release/*` must match `release/v1/hotfix`.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    // Iterative wildcard match with backtracking over the last `*`.
    let mut p = 0;
    let mut n = 0;
    let mut star: Option<usize> = None;
    let mut star_n = 0;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == name[n] || pattern[p] == '?') {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_n = n;
            p += 1;
        } else if let Some(star_p) = star {
            p = star_p + 1;
            star_n += 1;
            n = star_n;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

/// Whether any pattern in a rule's branch list matches the branch name.
pub fn branch_matches(patterns: &[String], branch: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_pattern(pattern, branch))
}
