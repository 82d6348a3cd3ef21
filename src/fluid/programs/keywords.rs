use std::fmt;

/// Compile-time switches of a kernel variant.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Keywords(u8);

impl Keywords {
    pub const NONE: Keywords = Keywords(0);
    pub const SHADING: Keywords = Keywords(1 << 0);
    pub const BLOOM: Keywords = Keywords(1 << 1);
    pub const SUNRAYS: Keywords = Keywords(1 << 2);
    pub const MANUAL_FILTERING: Keywords = Keywords(1 << 3);

    const NAMES: [(Keywords, &'static str); 4] = [
        (Keywords::SHADING, "SHADING"),
        (Keywords::BLOOM, "BLOOM"),
        (Keywords::SUNRAYS, "SUNRAYS"),
        (Keywords::MANUAL_FILTERING, "MANUAL_FILTERING"),
    ];

    pub fn contains(self, other: Keywords) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: Keywords, enabled: bool) {
        if enabled {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    pub fn with(mut self, other: Keywords, enabled: bool) -> Self {
        self.set(other, enabled);
        self
    }

    fn is_defined(self, name: &str) -> bool {
        Self::NAMES.iter().any(|(keyword, keyword_name)| *keyword_name == name && self.contains(*keyword))
    }
}

impl std::ops::BitOr for Keywords {
    type Output = Keywords;

    fn bitor(self, rhs: Keywords) -> Keywords {
        Keywords(self.0 | rhs.0)
    }
}

impl fmt::Debug for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES.iter()
            .filter(|(keyword, _)| self.contains(*keyword))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Keywords({})", names.join(" | "))
    }
}

/// Resolves `#ifdef NAME` / `#else` / `#endif` blocks against `keywords`.
///
/// Blocks nest. Directive lines are dropped from the output; an unbalanced
/// `#endif` or `#else` is ignored.
pub fn preprocess(source: &str, keywords: Keywords) -> String {
    // Each entry: (this block is active, the enclosing block is active).
    let mut stack: Vec<(bool, bool)> = Vec::new();
    let mut output = String::with_capacity(source.len());

    for line in source.lines() {
        let directive = line.trim();
        let enclosing_active = stack.last().is_none_or(|(active, _)| *active);

        if let Some(name) = directive.strip_prefix("#ifdef") {
            let defined = keywords.is_defined(name.trim());
            stack.push((enclosing_active && defined, enclosing_active));
        } else if directive.starts_with("#else") {
            if let Some((active, parent_active)) = stack.last_mut() {
                *active = *parent_active && !*active;
            }
        } else if directive.starts_with("#endif") {
            stack.pop();
        } else if enclosing_active {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}
