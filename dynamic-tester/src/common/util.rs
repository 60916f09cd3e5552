use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of player counts, keeping input order.
pub fn parse_player_counts(raw: &str) -> Result<Vec<u32>> {
    let counts = split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<u32>()
                .with_context(|| format!("invalid player count: {token}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if counts.is_empty() {
        bail!("at least one player count is required");
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_drops_blank_tokens() {
        assert_eq!(split_csv(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn player_counts_parse_in_order() {
        assert_eq!(parse_player_counts("40, 10,100").unwrap(), vec![40, 10, 100]);
    }

    #[test]
    fn player_counts_reject_garbage() {
        assert!(parse_player_counts("12,many").is_err());
        assert!(parse_player_counts(" , ").is_err());
    }
}
