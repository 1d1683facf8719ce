use crate::random::SharedRandom;

/// Consolation messages for claimants who win nothing
pub trait FactProvider: Send + Sync {
    fn random_fact(&self) -> String;
}

const CHRISTMAS_FACTS: &[&str] = &[
    "The first artificial Christmas trees were made in Germany from dyed goose feathers.",
    "Jingle Bells was originally written for Thanksgiving, not Christmas.",
    "Norway has sent London a Christmas tree for Trafalgar Square every year since 1947.",
    "Candy canes were reputedly bent into a crook shape to resemble a shepherd's staff.",
    "Tinsel was once made of real silver, which tarnished quickly in candlelight.",
    "The tradition of the Christmas log cake (bûche de Noël) dates back to 19th-century Paris.",
    "In Japan, a bucket of fried chicken is a popular Christmas Eve dinner.",
    "The song Silent Night has been translated into more than 300 languages.",
    "Rudolph the Red-Nosed Reindeer first appeared in a 1939 department store booklet.",
    "Male reindeer shed their antlers in winter, so Santa's team is probably all female.",
];

/// Fixed pool of Christmas trivia
#[derive(Debug, Clone)]
pub struct ChristmasFacts {
    random: SharedRandom,
}

impl ChristmasFacts {
    pub fn new(random: SharedRandom) -> Self {
        Self { random }
    }

    pub fn all() -> &'static [&'static str] {
        CHRISTMAS_FACTS
    }
}

impl FactProvider for ChristmasFacts {
    fn random_fact(&self) -> String {
        CHRISTMAS_FACTS[self.random.index(CHRISTMAS_FACTS.len())].to_string()
    }
}
