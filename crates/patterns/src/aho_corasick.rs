use std::collections::{HashMap, VecDeque};

/// One occurrence of a pattern in a scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub pattern: String,
    pub start: usize,
    pub end: usize,
    pub line_number: u32,
    pub context: String,
}

struct Node {
    children: HashMap<char, usize>,
    failure: usize,
    output: Vec<String>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            failure: 0,
            output: Vec::new(),
        }
    }
}

/// Multi-pattern string matching automaton: a trie over the
/// pattern set with breadth-first failure links and per-node output lists
/// merged along failure chains, searched in a single O(n) pass.
pub struct AhoCorasick {
    nodes: Vec<Node>,
    case_sensitive: bool,
}

impl AhoCorasick {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>, case_sensitive: bool) -> Self {
        let mut nodes = vec![Node::new()];
        let folded: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .map(|p| if case_sensitive { p } else { p.to_lowercase() })
            .filter(|p| !p.is_empty())
            .collect();

        for pattern in &folded {
            let mut current = 0usize;
            for ch in pattern.chars() {
                current = *nodes[current].children.entry(ch).or_insert_with(|| {
                    nodes.push(Node::new());
                    nodes.len() - 1
                });
            }
            nodes[current].output.push(pattern.clone());
        }

        let mut automaton = Self {
            nodes,
            case_sensitive,
        };
        automaton.build_failure_links();
        automaton
    }

    fn build_failure_links(&mut self) {
        let mut queue = VecDeque::new();
        let root_children: Vec<usize> = self.nodes[0].children.values().copied().collect();
        for &child in &root_children {
            self.nodes[child].failure = 0;
            queue.push_back(child);
        }

        while let Some(current) = queue.pop_front() {
            let children: Vec<(char, usize)> = self.nodes[current]
                .children
                .iter()
                .map(|(&c, &n)| (c, n))
                .collect();
            for (ch, child) in children {
                queue.push_back(child);

                // Climb failure links from `current`'s own failure node until
                // one has a `ch` transition, or we exhaust the chain at root.
                let mut failure = self.nodes[current].failure;
                while failure != 0 && !self.nodes[failure].children.contains_key(&ch) {
                    failure = self.nodes[failure].failure;
                }
                self.nodes[child].failure = self.nodes[failure].children.get(&ch).copied().unwrap_or(0);

                let failure_output = self.nodes[self.nodes[child].failure].output.clone();
                if !failure_output.is_empty() {
                    self.nodes[child].output.extend(failure_output);
                }
            }
        }
    }

    /// Scans `text` for every pattern, recording byte offsets, a 1-indexed
    /// line number, and a surrounding snippet clipped to `context_chars` on
    /// each side.
    pub fn search(&self, text: &str, context_chars: usize) -> Vec<Match> {
        let folded;
        let haystack: &str = if self.case_sensitive {
            text
        } else {
            folded = text.to_lowercase();
            &folded
        };

        let chars: Vec<char> = haystack.chars().collect();
        let byte_offsets: Vec<usize> = {
            let mut offsets = Vec::with_capacity(chars.len() + 1);
            let mut pos = 0;
            for ch in &chars {
                offsets.push(pos);
                pos += ch.len_utf8();
            }
            offsets.push(pos);
            offsets
        };

        let mut line_starts = vec![0usize];
        for (i, ch) in chars.iter().enumerate() {
            if *ch == '\n' {
                line_starts.push(i + 1);
            }
        }

        let mut matches = Vec::new();
        let mut node = 0usize;

        for (i, ch) in chars.iter().enumerate() {
            loop {
                if let Some(&next) = self.nodes[node].children.get(ch) {
                    node = next;
                    break;
                }
                if node == 0 {
                    break;
                }
                node = self.nodes[node].failure;
            }

            if !self.nodes[node].output.is_empty() {
                for pattern in &self.nodes[node].output {
                    let pattern_len = pattern.chars().count();
                    let start_char = i + 1 - pattern_len;
                    let end_char = i + 1;
                    let start = byte_offsets[start_char];
                    let end = byte_offsets[end_char];

                    let line_number = match line_starts.binary_search(&start_char) {
                        Ok(idx) => idx + 1,
                        Err(idx) => idx,
                    } as u32;

                    let ctx_start_char = start_char.saturating_sub(context_chars);
                    let ctx_end_char = (end_char + context_chars).min(chars.len());
                    let context: String = chars[ctx_start_char..ctx_end_char].iter().collect();

                    matches.push(Match {
                        pattern: pattern.clone(),
                        start,
                        end,
                        line_number,
                        context,
                    });
                }
            }
        }

        matches
    }

    /// [`Self::search`] grouped by the pattern that matched.
    pub fn search_by_pattern(&self, text: &str, context_chars: usize) -> HashMap<String, Vec<Match>> {
        let mut by_pattern: HashMap<String, Vec<Match>> = HashMap::new();
        for m in self.search(text, context_chars) {
            by_pattern.entry(m.pattern.clone()).or_default().push(m);
        }
        by_pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_all_patterns_case_insensitively() {
        let ac = AhoCorasick::new(["validate_password", "hash_password", "login"], false);
        let text = "The Validate_Password function checks strength.\nUse hash_password here.\nlogin authenticates users with validate_password.";
        let matches = ac.search(text, 10);
        let patterns: Vec<&str> = matches.iter().map(|m| m.pattern.as_str()).collect();
        assert!(patterns.contains(&"validate_password"));
        assert!(patterns.contains(&"hash_password"));
        assert!(patterns.contains(&"login"));
        assert_eq!(matches.iter().filter(|m| m.pattern == "validate_password").count(), 2);
    }

    #[test]
    fn line_numbers_are_one_indexed() {
        let ac = AhoCorasick::new(["foo"], false);
        let matches = ac.search("bar\nbaz\nfoo\n", 0);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 3);
    }

    #[test]
    fn overlapping_patterns_of_different_shapes_both_report() {
        let ac = AhoCorasick::new(["he", "she", "hers"], false);
        let matches = ac.search("ushers", 0);
        let patterns: Vec<&str> = matches.iter().map(|m| m.pattern.as_str()).collect();
        assert!(patterns.contains(&"she"));
        assert!(patterns.contains(&"he"));
        assert!(patterns.contains(&"hers"));
    }

    #[test]
    fn identical_input_yields_identical_matches_in_same_order() {
        let ac = AhoCorasick::new(["a", "ab"], false);
        let m1 = ac.search("xaby", 5);
        let m2 = ac.search("xaby", 5);
        assert_eq!(m1, m2);
    }

    #[test]
    fn empty_pattern_list_yields_no_matches() {
        let ac: AhoCorasick = AhoCorasick::new(Vec::<String>::new(), false);
        assert!(ac.search("anything", 5).is_empty());
    }
}
