#[cfg(test)]
mod tests {
    use rampart_core::components::ResistFlags;
    use rampart_core::content::{AuthoredWave, EnemyTemplate, RouteData};
    use rampart_core::types::Position;

    use crate::endless::{power_budget, total_enemy_count, waves_past_100};
    use crate::{generate, preview};

    fn template(key: &str, hp: f64, armor: f64, gold: u64) -> EnemyTemplate {
        EnemyTemplate {
            key: key.into(),
            hp,
            armor,
            speed: 60.0,
            power: 1.0,
            gold,
            regeneration: 0.0,
            invisible: false,
            resist: ResistFlags {
                can_burn: true,
                can_poison: true,
                can_slow: true,
                can_stun: true,
            },
            passive: None,
        }
    }

    /// Route with the boss at template slot 0 plus three trash types.
    fn route() -> RouteData {
        let waves = (1..=100)
            .map(|_| AuthoredWave {
                preview: vec![1, 2, 3],
                spawns: vec![1, 1, 2, 2, 3],
                spacing: 50.0,
            })
            .collect();
        RouteData {
            route_number: 0,
            templates: vec![
                template("warden", 50_000.0, 5_000.0, 500),
                template("scuttler", 100.0, 0.0, 5),
                template("bulwark", 400.0, 50.0, 12),
                template("strider", 250.0, 0.0, 8),
            ],
            waves,
            boss: 0,
            paths: vec![
                vec![Position::new(0.0, 100.0), Position::new(700.0, 100.0)],
                vec![Position::new(0.0, 300.0), Position::new(700.0, 300.0)],
            ],
            tiles: vec![],
        }
    }

    #[test]
    fn test_authored_wave_1_is_unscaled() {
        let wave = generate(&route(), 1);
        assert_eq!(wave.entries.len(), 5);
        let first = &wave.entries[0].template;
        assert_eq!(first.key, "scuttler");
        assert_eq!(first.hp, 100.0);
        assert_eq!(first.gold, 5);
    }

    #[test]
    fn test_authored_bucket_scaling() {
        // Wave 11: two full 5-wave steps -> +4% hp, +2% armor, +30% gold.
        let wave = generate(&route(), 11);
        let bulwark = wave
            .entries
            .iter()
            .find(|e| e.template.key == "bulwark")
            .unwrap();
        assert_eq!(bulwark.template.hp, (400.0f64 * 1.04).floor());
        assert_eq!(bulwark.template.armor, (50.0f64 * 1.02).floor());
        assert_eq!(bulwark.template.gold, (12.0f64 * 1.3).floor() as u64);
    }

    #[test]
    fn test_wave_100_boss_multiplier() {
        let wave99 = generate(&route(), 99);
        let wave100 = generate(&route(), 100);
        let hp99 = wave99.entries[0].template.hp;
        let hp100 = wave100.entries[0].template.hp;
        // Same bucket, but wave 100 doubles hp on top of it.
        assert!(
            (hp100 - (hp99 * 2.0)).abs() <= 2.0,
            "wave 100 should double hp: {hp99} -> {hp100}"
        );
    }

    #[test]
    fn test_generator_is_deterministic() {
        let route = route();
        for wave in [1, 37, 101, 150, 200, 423] {
            let a = generate(&route, wave);
            let b = generate(&route, wave);
            assert_eq!(a.entries.len(), b.entries.len(), "wave {wave}");
            for (x, y) in a.entries.iter().zip(&b.entries) {
                assert_eq!(x.template.key, y.template.key);
                assert_eq!(x.template.hp, y.template.hp);
                assert_eq!(x.template.gold, y.template.gold);
                assert_eq!(x.lead_distance, y.lead_distance);
                assert_eq!(x.path_index, y.path_index);
            }
            let pa = preview(&route, wave);
            let pb = preview(&route, wave);
            assert_eq!(pa.len(), pb.len());
            for (x, y) in pa.iter().zip(&pb) {
                assert_eq!(x.key, y.key);
                assert_eq!(x.hp, y.hp);
            }
        }
    }

    #[test]
    fn test_first_endless_wave_budget() {
        // Wave 101: wp == 1, budget and count per the documented formulas.
        assert_eq!(waves_past_100(101), 1);
        let budget = power_budget(101);
        assert_eq!(budget, (160_000.0f64 * 1.115).floor());
        let count = total_enemy_count(101);
        assert_eq!(count, (20.0f64 + 1.2).floor() as usize);

        let wave = generate(&route(), 101);
        let total_hp: f64 = wave.entries.iter().map(|e| e.template.hp).sum();
        // Per-enemy floors round each entry down by at most 1.
        assert!(
            total_hp <= budget && total_hp >= budget - wave.entries.len() as f64,
            "scaled hp sum {total_hp} should approximate budget {budget}"
        );
    }

    #[test]
    fn test_endless_count_distribution_favors_weak_types() {
        let wave = generate(&route(), 150);
        let scuttlers = wave
            .entries
            .iter()
            .filter(|e| e.template.key == "scuttler")
            .count();
        let bulwarks = wave
            .entries
            .iter()
            .filter(|e| e.template.key == "bulwark")
            .count();
        assert!(
            scuttlers > bulwarks,
            "low-hp types should outnumber high-hp types: {scuttlers} vs {bulwarks}"
        );
        // Every pool type appears at least once.
        assert!(bulwarks >= 1);
        assert!(wave
            .entries
            .iter()
            .any(|e| e.template.key == "strider"));
    }

    #[test]
    fn test_endless_gold_scaling() {
        let wave = generate(&route(), 120);
        let scuttler = wave
            .entries
            .iter()
            .find(|e| e.template.key == "scuttler")
            .unwrap();
        assert_eq!(scuttler.template.gold, (5.0f64 * (1.0 + 20.0 * 0.11)).floor() as u64);
    }

    #[test]
    fn test_endless_budget_curve_steepens_past_200() {
        let before = power_budget(199);
        let after = power_budget(240);
        assert!(after > before);
        // Past 200 the multiplier is wave/16, not the linear ramp.
        assert_eq!(power_budget(320), (160_000.0f64 * 20.0).floor());
    }

    #[test]
    fn test_endless_cluster_spacing_monotonic() {
        let wave = generate(&route(), 101);
        let leads: Vec<f64> = wave.entries.iter().map(|e| e.lead_distance).collect();
        // Spawn slots march strictly backward from the field edge; no two
        // enemies share one.
        for pair in leads.windows(2) {
            assert!(pair[1] > pair[0], "leads must strictly increase: {pair:?}");
        }
        assert!(leads[0] >= 50.0, "the pack starts fully off-field");
    }

    #[test]
    fn test_boss_wave_spawns_n_bosses() {
        let route = route();
        let wave200 = generate(&route, 200);
        assert_eq!(wave200.entries.len(), 2);
        assert!(wave200.entries.iter().all(|e| e.template.key == "warden"));

        let wave300 = generate(&route, 300);
        let bosses = wave300
            .entries
            .iter()
            .filter(|e| e.template.key == "warden")
            .count();
        assert_eq!(bosses, 3);
        // Escorts appear from wave 300: (300-200)/50 * 5 = 10.
        assert_eq!(wave300.entries.len() - bosses, 10);
        assert_eq!(wave300.preview.len(), 1);
    }

    #[test]
    fn test_degenerate_template_falls_back() {
        let mut route = route();
        for wave in route.waves.iter_mut() {
            wave.preview.clear();
            wave.spawns.clear();
        }
        // No templates to synthesize from: a single-enemy roster, not a panic.
        let wave = generate(&route, 101);
        assert_eq!(wave.entries.len(), 1);
        let authored = generate(&route, 5);
        assert_eq!(authored.entries.len(), 1);
    }

    #[test]
    fn test_zero_hp_pool_falls_back() {
        let mut route = route();
        for t in route.templates.iter_mut() {
            t.hp = 0.0;
        }
        let wave = generate(&route, 101);
        assert_eq!(wave.entries.len(), 1, "zero total hp must not divide");
    }
}
