use super::*;

fn known(kind: CampaignKind) -> DeclaredType {
    DeclaredType::Known(kind)
}

// =============================================================================
// default routing
// =============================================================================

#[test]
fn chance_games_default_to_unlocked() {
    for kind in [CampaignKind::Wheel, CampaignKind::Scratch, CampaignKind::Jackpot, CampaignKind::Dice] {
        let r = route(&known(kind), None);
        assert_eq!(r.funnel, FunnelKind::Unlocked, "{kind:?}");
        assert_eq!(r.surface, GameSurface::Game(kind));
    }
}

#[test]
fn skill_games_default_to_standard() {
    for kind in [CampaignKind::Quiz, CampaignKind::Memory, CampaignKind::Puzzle, CampaignKind::Form] {
        let r = route(&known(kind), None);
        assert_eq!(r.funnel, FunnelKind::Standard, "{kind:?}");
        assert_eq!(r.surface, GameSurface::Game(kind));
    }
}

#[test]
fn wheel_without_override_is_unlocked() {
    let declared = DeclaredType::from("wheel".to_string());
    assert_eq!(route(&declared, None).funnel, FunnelKind::Unlocked);
}

#[test]
fn every_kind_maps_to_exactly_one_funnel() {
    for kind in CampaignKind::ALL {
        for funnel_override in [None, Some(FunnelKind::Unlocked), Some(FunnelKind::Standard)] {
            let r = route(&known(kind), funnel_override);
            let paths = [FunnelKind::Unlocked, FunnelKind::Standard]
                .into_iter()
                .filter(|f| *f == r.funnel)
                .count();
            assert_eq!(paths, 1);
        }
    }
}

// =============================================================================
// overrides
// =============================================================================

#[test]
fn explicit_override_wins() {
    let r = route(&known(CampaignKind::Wheel), Some(FunnelKind::Standard));
    assert_eq!(r.funnel, FunnelKind::Standard);
    assert_eq!(r.surface, GameSurface::Game(CampaignKind::Wheel));
}

#[test]
fn skill_game_forced_onto_unlocked_falls_back() {
    let r = route(&known(CampaignKind::Quiz), Some(FunnelKind::Unlocked));
    assert_eq!(r.funnel, FunnelKind::Unlocked);
    assert_eq!(r.surface, GameSurface::Fallback(INCOMPATIBLE_MESSAGE.to_string()));
}

// =============================================================================
// unknown types
// =============================================================================

#[test]
fn unknown_type_renders_fallback_on_standard() {
    let declared = DeclaredType::from("slot-machine".to_string());
    let r = route(&declared, None);
    assert_eq!(r.funnel, FunnelKind::Standard);
    assert!(matches!(r.surface, GameSurface::Fallback(ref msg) if msg.contains("not compatible with this funnel")));
    assert_eq!(r.surface.game(), None);
}

#[test]
fn unknown_type_with_override_keeps_override() {
    let declared = DeclaredType::from("bingo".to_string());
    let r = route(&declared, Some(FunnelKind::Unlocked));
    assert_eq!(r.funnel, FunnelKind::Unlocked);
    assert!(matches!(r.surface, GameSurface::Fallback(_)));
}

#[test]
fn route_serializes_for_clients() {
    let r = route(&known(CampaignKind::Dice), None);
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["funnel"], "unlocked");
    assert_eq!(json["surface"]["kind"], "game");
    assert_eq!(json["surface"]["value"], "dice");
}
