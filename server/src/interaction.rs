use glam::Vec3;
use gallery_shared::config::InteractionConfig;

pub const PAINTING_PROMPT: &str = "Press 'B' to buy artwork";
pub const MUSHROOM_PROMPT: &str = "Don't press 'E' to eat, it's poison";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Painting,
    Mushroom,
}

impl InteractionKind {
    pub fn prompt(self) -> &'static str {
        match self {
            InteractionKind::Painting => PAINTING_PROMPT,
            InteractionKind::Mushroom => MUSHROOM_PROMPT,
        }
    }
}

/// A tagged scene node. Built once when the scene loads, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub kind: InteractionKind,
    pub name: String,
    /// Shop link for paintings; `None` for mushrooms.
    pub url: Option<String>,
    pub position: Vec3,
}

/// Pick the interactable the viewer at `eye` is close enough to use.
///
/// Every node is checked in list order and the last one in range wins.
/// Paintings and mushrooms have separate thresholds, both strict. Returns
/// the index of the winner.
pub fn scan(
    interactables: &[Interactable],
    eye: Vec3,
    config: &InteractionConfig,
) -> Option<usize> {
    let mut current = None;
    for (index, item) in interactables.iter().enumerate() {
        let threshold = match item.kind {
            InteractionKind::Painting => config.painting_distance,
            InteractionKind::Mushroom => config.mushroom_distance,
        };
        if item.position.distance(eye) < threshold {
            current = Some(index);
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painting(name: &str, position: Vec3) -> Interactable {
        Interactable {
            kind: InteractionKind::Painting,
            name: name.to_string(),
            url: Some("#".to_string()),
            position,
        }
    }

    fn mushroom(name: &str, position: Vec3) -> Interactable {
        Interactable {
            kind: InteractionKind::Mushroom,
            name: name.to_string(),
            url: None,
            position,
        }
    }

    fn hit_name<'a>(items: &'a [Interactable], config: &InteractionConfig) -> Option<&'a str> {
        scan(items, Vec3::ZERO, config).map(|i| items[i].name.as_str())
    }

    #[test]
    fn nothing_in_range() {
        let items = vec![painting("painting_a", Vec3::new(50.0, 0.0, 0.0))];
        assert!(scan(&items, Vec3::ZERO, &InteractionConfig::default()).is_none());
        assert!(scan(&[], Vec3::ZERO, &InteractionConfig::default()).is_none());
    }

    #[test]
    fn painting_threshold_is_strict() {
        let config = InteractionConfig::default();
        let near = vec![painting("painting_a", Vec3::new(9.999, 0.0, 0.0))];
        assert_eq!(hit_name(&near, &config), Some("painting_a"));

        let edge = vec![painting("painting_a", Vec3::new(10.0, 0.0, 0.0))];
        assert!(scan(&edge, Vec3::ZERO, &config).is_none());
    }

    #[test]
    fn mushroom_uses_its_own_threshold() {
        let config = InteractionConfig::default();
        let items = vec![mushroom("mushroom_1", Vec3::new(0.0, 0.0, 5.0))];
        assert!(scan(&items, Vec3::ZERO, &config).is_none());
        let items = vec![mushroom("mushroom_1", Vec3::new(0.0, 0.0, 2.5))];
        assert_eq!(scan(&items, Vec3::ZERO, &config), Some(0));
    }

    #[test]
    fn last_match_wins_regardless_of_distance() {
        let config = InteractionConfig::default();
        let items = vec![
            mushroom("mushroom_1", Vec3::new(0.5, 0.0, 0.0)),
            painting("painting_far", Vec3::new(8.0, 0.0, 0.0)),
        ];
        assert_eq!(scan(&items, Vec3::ZERO, &config), Some(1));
        assert_eq!(hit_name(&items, &config), Some("painting_far"));

        let items = vec![
            painting("painting_far", Vec3::new(8.0, 0.0, 0.0)),
            mushroom("mushroom_1", Vec3::new(0.5, 0.0, 0.0)),
        ];
        assert_eq!(hit_name(&items, &config), Some("mushroom_1"));
    }

    #[test]
    fn prompts_follow_kind() {
        assert_eq!(InteractionKind::Painting.prompt(), "Press 'B' to buy artwork");
        assert_eq!(
            InteractionKind::Mushroom.prompt(),
            "Don't press 'E' to eat, it's poison"
        );
    }
}
