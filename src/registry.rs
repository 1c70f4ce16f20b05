use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{address, Address};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Chain every tracked staking contract is deployed on.
pub const CHAIN_NAME: &str = "Base Sepolia";

/// Decimals used to normalize `totalAmountStaked()` for every token.
///
/// The staking contracts on the test deployment all report 6-decimal
/// amounts, so this is not looked up per token.
pub const STAKED_DECIMALS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSymbol {
    Uni,
    Usdc,
    Usdt,
    Dai,
    Weth,
}

impl TokenSymbol {
    pub const ALL: [TokenSymbol; 5] = [
        TokenSymbol::Uni,
        TokenSymbol::Usdc,
        TokenSymbol::Usdt,
        TokenSymbol::Dai,
        TokenSymbol::Weth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenSymbol::Uni => "UNI",
            TokenSymbol::Usdc => "USDC",
            TokenSymbol::Usdt => "USDT",
            TokenSymbol::Dai => "DAI",
            TokenSymbol::Weth => "WETH",
        }
    }

    pub fn is_stablecoin(self) -> bool {
        matches!(self, TokenSymbol::Usdc | TokenSymbol::Usdt)
    }

    pub fn categories(self) -> Vec<String> {
        let mut categories = vec!["Staking".to_string()];
        if self.is_stablecoin() {
            categories.push("Stablecoin".to_string());
        }
        categories
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked token and the staking contract that reports its yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEntry {
    pub symbol: TokenSymbol,
    pub token: Address,
    pub staking: Address,
    pub project: &'static str,
}

impl TokenEntry {
    /// `{project}_{symbol}`, e.g. `AaveV3_USDC`.
    pub fn protocol_id(&self) -> String {
        format!("{}_{}", self.project, self.symbol)
    }
}

pub fn entry(symbol: TokenSymbol) -> TokenEntry {
    let (token, staking, project) = match symbol {
        TokenSymbol::Uni => (
            address!("0x1eaC9BB63f8673906dBb75874356E33Ab7d5D780"),
            address!("0xa42A86906D3FDfFE7ccc1a4E143e5Ddd8dF0Cf83"),
            "Uniswap",
        ),
        TokenSymbol::Usdc => (
            address!("0x0E8Ac3cc5183A243FcbA007136135A14831fDA99"),
            address!("0x5dC10711C60dd5174306aEC6Fb1c78b895C9fA5A"),
            "AaveV3",
        ),
        TokenSymbol::Usdt => (
            address!("0xbF1876d7643a1d7DA52C7B8a67e7D86aeeAA12A6"),
            address!("0xD1b1954896009800dF01b197A6E8E1d98FF44ae8"),
            "CompoundV3",
        ),
        TokenSymbol::Dai => (
            address!("0xD1d25fc5faC3cd5EE2daFE6292C5DFC16057D4d1"),
            address!("0x0CAf83Ef2BA9242F174FCE98E30B9ceba299aaa3"),
            "StargateV3",
        ),
        TokenSymbol::Weth => (
            address!("0x134C06B12eA6b1c7419a08085E0de6bDA9A16dA2"),
            address!("0x6c36eD76d3FF0A7C0309aef473052b487895Fadf"),
            "UsdxMoney",
        ),
    };

    TokenEntry {
        symbol,
        token,
        staking,
        project,
    }
}

pub fn entries() -> impl Iterator<Item = TokenEntry> {
    TokenSymbol::ALL.into_iter().map(entry)
}

lazy_static! {
    static ref LOGOS: HashMap<Address, &'static str> = {
        let mut m = HashMap::new();
        m.insert(entry(TokenSymbol::Uni).token, "https://cryptologos.cc/logos/uniswap-uni-logo.png");
        m.insert(entry(TokenSymbol::Usdc).token, "https://cryptologos.cc/logos/usd-coin-usdc-logo.png");
        m.insert(entry(TokenSymbol::Usdt).token, "https://cryptologos.cc/logos/tether-usdt-logo.png");
        m.insert(entry(TokenSymbol::Dai).token, "https://cryptologos.cc/logos/dai-dai-logo.png");
        m.insert(entry(TokenSymbol::Weth).token, "https://img.cryptorank.io/coins/weth1701090834118.png");
        m
    };
}

/// Display image for a token contract, empty when none is known.
pub fn logo_for(token: &Address) -> &'static str {
    LOGOS.get(token).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_five_distinct_tokens() {
        let tokens: std::collections::HashSet<_> = entries().map(|e| e.token).collect();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn protocol_id_joins_project_and_symbol() {
        assert_eq!(entry(TokenSymbol::Usdc).protocol_id(), "AaveV3_USDC");
        assert_eq!(entry(TokenSymbol::Weth).protocol_id(), "UsdxMoney_WETH");
    }

    #[test]
    fn only_dollar_tokens_are_stablecoins() {
        for sym in TokenSymbol::ALL {
            let expected = matches!(sym, TokenSymbol::Usdc | TokenSymbol::Usdt);
            assert_eq!(sym.is_stablecoin(), expected, "{sym}");
        }
        assert_eq!(TokenSymbol::Usdt.categories(), vec!["Staking", "Stablecoin"]);
        assert_eq!(TokenSymbol::Dai.categories(), vec!["Staking"]);
    }

    #[test]
    fn every_token_has_a_logo() {
        for e in entries() {
            assert!(logo_for(&e.token).starts_with("https://"), "{}", e.symbol);
        }
        assert_eq!(logo_for(&Address::ZERO), "");
    }
}
