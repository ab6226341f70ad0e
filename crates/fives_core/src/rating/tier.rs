use serde::{Deserialize, Serialize};

/// Named rating band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Developing,
    Regular,
    Pro,
    Elite,
    Legend,
}

impl Tier {
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            0..=59 => Tier::Developing,
            60..=69 => Tier::Regular,
            70..=79 => Tier::Pro,
            80..=89 => Tier::Elite,
            _ => Tier::Legend,
        }
    }

    /// 1 (Developing) through 5 (Legend)
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Developing => 1,
            Tier::Regular => 2,
            Tier::Pro => 3,
            Tier::Elite => 4,
            Tier::Legend => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Developing => "Developing",
            Tier::Regular => "Regular",
            Tier::Pro => "Pro",
            Tier::Elite => "Elite",
            Tier::Legend => "Legend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_rating(40), Tier::Developing);
        assert_eq!(Tier::from_rating(59), Tier::Developing);
        assert_eq!(Tier::from_rating(60), Tier::Regular);
        assert_eq!(Tier::from_rating(79), Tier::Pro);
        assert_eq!(Tier::from_rating(80), Tier::Elite);
        assert_eq!(Tier::from_rating(90), Tier::Legend);
        assert_eq!(Tier::from_rating(99), Tier::Legend);
    }

    #[test]
    fn test_rank_follows_ordering() {
        assert!(Tier::Pro > Tier::Regular);
        assert_eq!(Tier::Pro.rank(), 3);
        assert_eq!(Tier::Legend.rank(), 5);
    }
}
