use serde::Serialize;

/// Largest edit distance still treated as a deliberate misspelling
pub const MAX_TYPO_DISTANCE: usize = 2;

/// Character substitutions commonly used to disguise a brand name.
/// Applied cumulatively, in this order, to the name part of a reference domain.
pub const CHARACTER_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("o", "0"),
    ("i", "1"),
    ("l", "1"),
    ("e", "3"),
    ("a", "@"),
    ("m", "rn"),
    ("w", "vv"),
    ("cl", "d"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TyposquatKind {
    EditDistance,
    CharacterSubstitution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TyposquatMatch {
    pub reference: String,
    pub distance: usize,
    pub kind: TyposquatKind,
}

/// Levenshtein edit distance over Unicode scalar values.
///
/// Fills the full `(a+1) x (b+1)` table: row and column zero hold their
/// index, and every other cell takes the diagonal when the characters agree,
/// otherwise one plus the cheapest of substitution, insertion or deletion.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j - 1].min(dp[i][j - 1]).min(dp[i - 1][j])
            };
        }
    }

    dp[m][n]
}

/// Edit-distance typosquat rule: a close but non-identical spelling that is
/// not drastically shorter than the reference.
pub fn is_typosquat(candidate: &str, reference: &str) -> bool {
    if candidate == reference {
        return false;
    }

    let candidate_len = candidate.chars().count();
    let reference_len = reference.chars().count();

    levenshtein(candidate, reference) <= MAX_TYPO_DISTANCE && candidate_len + 2 >= reference_len
}

/// Substitution heuristic: does the candidate contain the reference with
/// look-alike characters swapped in? Substitutions accumulate in table order
/// and every intermediate spelling is tried, so mixed forms such as
/// `g00g1e.com` are caught.
pub fn leet_variant_match(candidate: &str, reference: &str) -> bool {
    if candidate == reference {
        return false;
    }

    let (name, suffix) = match reference.rfind('.') {
        Some(pos) => reference.split_at(pos),
        None => (reference, ""),
    };

    let mut variant = name.to_string();
    for (original, substitute) in CHARACTER_SUBSTITUTIONS {
        variant = variant.replace(original, substitute);
        if variant != name && candidate.contains(&format!("{}{}", variant, suffix)) {
            return true;
        }
    }

    false
}

/// Scans an ordered list of legitimate domains for one the candidate imitates
#[derive(Debug, Clone)]
pub struct TyposquatDetector<'a> {
    references: &'a [String],
}

impl<'a> TyposquatDetector<'a> {
    pub fn new(references: &'a [String]) -> Self {
        Self { references }
    }

    /// First reference (in list order) the candidate is an edit-distance typosquat of
    pub fn find_edit_distance_match(&self, candidate: &str) -> Option<TyposquatMatch> {
        self.references
            .iter()
            .find(|reference| is_typosquat(candidate, reference))
            .map(|reference| TyposquatMatch {
                reference: reference.clone(),
                distance: levenshtein(candidate, reference),
                kind: TyposquatKind::EditDistance,
            })
    }

    /// First reference (in list order) whose look-alike spelling the candidate contains
    pub fn find_substitution_match(&self, candidate: &str) -> Option<TyposquatMatch> {
        self.references
            .iter()
            .find(|reference| leet_variant_match(candidate, reference))
            .map(|reference| TyposquatMatch {
                reference: reference.clone(),
                distance: levenshtein(candidate, reference),
                kind: TyposquatKind::CharacterSubstitution,
            })
    }

    /// Edit distance first, substitution as fallback
    pub fn find_match(&self, candidate: &str) -> Option<TyposquatMatch> {
        self.find_edit_distance_match(candidate)
            .or_else(|| self.find_substitution_match(candidate))
    }
}
