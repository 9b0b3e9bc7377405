use serde::{Deserialize, Serialize};

/// Built-in search strategies selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    RandomWalk,
    Genetic,
    GradientGuided,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::RandomWalk,
        StrategyKind::Genetic,
        StrategyKind::GradientGuided,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::RandomWalk => "RandomWalk",
            StrategyKind::Genetic => "Genetic",
            StrategyKind::GradientGuided => "GradientGuided",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "randomwalk" => Ok(StrategyKind::RandomWalk),
            "genetic" => Ok(StrategyKind::Genetic),
            "gradientguided" => Ok(StrategyKind::GradientGuided),
            _ => anyhow::bail!(
                "Invalid strategy: {}. Valid: RandomWalk, Genetic, GradientGuided",
                s
            ),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
