//! The two marker entities that carry floating point state
use crate::common::{Coordinates, MinecraftCommand};

/// One of the two comparison markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    A,
    B,
}

impl Marker {
    pub const HOME: (f64, f64, f64) = (0.0, -512.0, 0.0);
    /// The chunk that contains [`Marker::HOME`]
    pub const HOME_CHUNK: (i32, i32) = (0, 0);

    pub fn uuid(self) -> &'static str {
        match self {
            Marker::A => "43494e44-4552-4d41-524b-000000000001",
            Marker::B => "43494e44-4552-4d41-524b-000000000002",
        }
    }

    fn uuid_array(self) -> [i32; 4] {
        let last = match self {
            Marker::A => 1,
            Marker::B => 2,
        };
        [0x4349_4e44, 0x4552_4d41, 0x524b_0000, last]
    }

    pub fn tag(self, namespace: &str) -> String {
        match self {
            Marker::A => format!("{namespace}.cmp_a"),
            Marker::B => format!("{namespace}.cmp_b"),
        }
    }

    pub fn common_tag(namespace: &str) -> String {
        format!("{namespace}.marker")
    }

    pub fn home() -> Coordinates {
        let (x, y, z) = Self::HOME;
        Coordinates::absolute(x, y, z)
    }

    /// The summon command that spawns this marker at home
    pub fn summon(self, namespace: &str) -> MinecraftCommand {
        let [a, b, c, d] = self.uuid_array();
        let nbt = format!(
            r#"{{UUID:[I;{a},{b},{c},{d}],Tags:["{}","{}"]}}"#,
            Self::common_tag(namespace),
            self.tag(namespace)
        );
        MinecraftCommand::Summon {
            entity: "minecraft:marker".into(),
            position: Some(Self::home()),
            nbt: Some(nbt.into()),
        }
    }

    /// Kills every marker of this namespace
    pub fn kill_all(namespace: &str) -> MinecraftCommand {
        MinecraftCommand::Kill {
            target: format!("@e[type=minecraft:marker,tag={}]", Self::common_tag(namespace)).into(),
        }
    }
}
