use anyhow::{Context, bail};

/// Ordered alias table mapping chat shorthand to canonical terminal symbols.
///
/// Resolution is a substring scan over the declared aliases, first match
/// wins. Matching is deliberately not whole-word: "XAU" also matches inside
/// "XAUUSD", which is what live signal feeds rely on.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    aliases: Vec<(String, String)>,
}

impl SymbolTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(alias, canonical)| {
                    (alias.into().to_uppercase(), canonical.into().to_uppercase())
                })
                .collect(),
        }
    }

    /// Parses an override spec of the form `"GOLD=XAUUSD,US30=DJ30"`.
    /// Declaration order is preserved and matters for resolution.
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let mut aliases = Vec::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (alias, canonical) = entry
                .split_once('=')
                .with_context(|| format!("bad alias entry '{entry}', expected ALIAS=SYMBOL"))?;
            let (alias, canonical) = (alias.trim(), canonical.trim());
            if alias.is_empty() || canonical.is_empty() {
                bail!("bad alias entry '{entry}', expected ALIAS=SYMBOL");
            }
            aliases.push((alias.to_uppercase(), canonical.to_uppercase()));
        }
        if aliases.is_empty() {
            bail!("alias table is empty");
        }
        Ok(Self { aliases })
    }

    /// Returns the canonical symbol for the first alias found in `text`.
    /// Expects `text` to be uppercased already.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(alias, _)| text.contains(alias.as_str()))
            .map(|(_, canonical)| canonical.as_str())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::from_pairs([
            ("GOLD", "XAUUSD"),
            ("XAU", "XAUUSD"),
            ("NAS100", "USTEC"),
            ("US30", "DJ30"),
        ])
    }
}
