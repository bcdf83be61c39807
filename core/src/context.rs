//! The run context: one typed slot per state provider.
//!
//! RULES:
//!   - There is no global "current instance" of any provider. Whoever needs
//!     a provider is handed the context.
//!   - A slot may be empty (provider not yet initialized). Capture writes an
//!     empty section for it; gameplay hooks fail with ProviderUnavailable.
//!   - Effective modifiers are never cached here. They are composed on demand
//!     from the raw run-modifier state, today's event and legacy points.

use crate::{
    ballista::BallistaRoster,
    clock::DayNightClock,
    config::EngineConfig,
    daily_event::DailyEvents,
    defenders::DefenderRoster,
    economy::Economy,
    enemies::EnemyRoster,
    error::{SimError, SimResult},
    fortification::WallRoster,
    loot::GroundLoot,
    menials::MenialRoster,
    modifiers::{EffectiveModifiers, ModifierSources},
    provider::{RosterProvider, StateProvider},
    purchases::{PurchaseLedger, UpgradeKind},
    rng::StreamRng,
    run_modifiers::RunModifiers,
    stats::RunStatsTracker,
    types::{Difficulty, EntityId, MenialTask, Quat, Vec3},
};

/// Choices fixed when a run starts.
#[derive(Debug, Clone, Default)]
pub struct RunSetup {
    pub difficulty:    Difficulty,
    pub commander:     Option<String>,
    pub mutators:      Vec<String>,
    /// Cross-run progression. Not part of the run snapshot.
    pub legacy_points: u32,
}

pub struct GameContext {
    pub config:        EngineConfig,
    pub legacy_points: u32,

    pub economy:       Option<Economy>,
    pub clock:         Option<DayNightClock>,
    pub walls:         Option<WallRoster>,
    pub ballistas:     Option<BallistaRoster>,
    pub defenders:     Option<DefenderRoster>,
    pub enemies:       Option<EnemyRoster>,
    pub menials:       Option<MenialRoster>,
    pub loot:          Option<GroundLoot>,
    pub purchases:     Option<PurchaseLedger>,
    pub run_modifiers: Option<RunModifiers>,
    pub daily_events:  Option<DailyEvents>,
    pub stats:         Option<RunStatsTracker>,
}

fn require<'a, T>(slot: &'a mut Option<T>, name: &'static str) -> SimResult<&'a mut T> {
    slot.as_mut().ok_or(SimError::ProviderUnavailable { name })
}

impl GameContext {
    /// A context with every provider slot empty.
    pub fn empty(config: EngineConfig, legacy_points: u32) -> Self {
        Self {
            config,
            legacy_points,
            economy: None,
            clock: None,
            walls: None,
            ballistas: None,
            defenders: None,
            enemies: None,
            menials: None,
            loot: None,
            purchases: None,
            run_modifiers: None,
            daily_events: None,
            stats: None,
        }
    }

    /// Build every provider in its default starting state.
    ///
    /// This is the "initialize defaults" phase of run startup. The opening
    /// layout (walls, ballistas, menials, a first wave) is spawned here and
    /// later torn down by a restore if one is pending.
    pub fn initialize(
        config: EngineConfig,
        setup: &RunSetup,
        spawn_rng: &mut StreamRng,
    ) -> SimResult<Self> {
        let mut ctx = Self::empty(config, setup.legacy_points);

        let mut run_modifiers = RunModifiers::new(&ctx.config, setup.difficulty);
        if let Some(commander) = &setup.commander {
            run_modifiers.select_commander(commander)?;
        }
        for mutator in &setup.mutators {
            run_modifiers.activate_mutator(mutator)?;
        }
        ctx.run_modifiers = Some(run_modifiers);
        ctx.daily_events = Some(DailyEvents::new(ctx.config.daily_events.clone()));
        ctx.purchases = Some(PurchaseLedger::new(ctx.config.costs.clone()));
        ctx.stats = Some(RunStatsTracker::new());

        let mods = ctx.effective_modifiers();
        let start = ctx.config.starting.clone();

        ctx.economy = Some(Economy::new(mods.starting_gold(start.gold)));
        ctx.clock = Some(DayNightClock::new(start.day_length_seconds, start.night_length_seconds));

        let mut walls = WallRoster::new();
        for position in &start.wall_positions {
            let max_health = mods.wall_health(start.wall_max_health);
            walls.spawn_completed(*position, Quat::IDENTITY, max_health);
        }
        ctx.walls = Some(walls);

        let mut ballistas = BallistaRoster::new();
        for position in &start.ballista_positions {
            let id = ballistas.place(
                *position,
                Quat::IDENTITY,
                start.ballista_damage,
                start.ballista_fire_rate,
            );
            if ballistas.active().is_none() {
                ballistas.set_active(&id);
            }
        }
        ctx.ballistas = Some(ballistas);

        let mut menials = MenialRoster::new();
        for _ in 0..mods.starting_menials(start.menials) {
            menials.spawn(start.menial_spawn, start.menial_max_health);
        }
        ctx.menials = Some(menials);
        ctx.sync_menial_counters()?;

        ctx.defenders = Some(DefenderRoster::new(ctx.config.defenders.clone()));
        ctx.loot = Some(GroundLoot::new());

        let mut enemies = EnemyRoster::new(ctx.config.enemies.clone());
        enemies.apply_modifiers(&mods);
        for _ in 0..mods.spawn_count(start.opening_enemies) {
            let angle = spawn_rng.range_f32(0.0, std::f32::consts::TAU);
            let position = Vec3::new(
                start.enemy_spawn_radius * angle.cos(),
                0.0,
                start.enemy_spawn_radius * angle.sin(),
            );
            let facing = Quat::from_yaw_degrees(angle.to_degrees() + 180.0);
            enemies.spawn(&start.opening_enemy_kind, position, facing, 1.0)?;
        }
        ctx.enemies = Some(enemies);

        Ok(ctx)
    }

    /// Fold every modifier source into the values gameplay uses right now.
    pub fn effective_modifiers(&self) -> EffectiveModifiers {
        let raw = self
            .run_modifiers
            .as_ref()
            .map(StateProvider::project_state)
            .unwrap_or_default();
        let event = self.daily_events.as_ref().and_then(DailyEvents::current_modifiers);
        ModifierSources::resolve(&self.config, &raw, event, self.legacy_points).compose()
    }

    /// Push freshly composed modifiers into providers that cache derived stats.
    pub fn refresh_derived(&mut self) {
        let mods = self.effective_modifiers();
        if let Some(enemies) = self.enemies.as_mut() {
            enemies.apply_modifiers(&mods);
        }
    }

    /// Mirror the menial roster into the economy counters.
    pub fn sync_menial_counters(&mut self) -> SimResult<()> {
        let counts = self
            .menials
            .as_ref()
            .ok_or(SimError::ProviderUnavailable { name: "menials" })?
            .counts();
        require(&mut self.economy, "economy")?.set_menial_counts(counts.total, counts.idle);
        Ok(())
    }

    // ── Purchases ──────────────────────────────────────────────────

    /// Price of the next purchase of `kind`.
    pub fn quote(&self, kind: UpgradeKind) -> SimResult<u32> {
        let purchases = self
            .purchases
            .as_ref()
            .ok_or(SimError::ProviderUnavailable { name: "purchases" })?;
        Ok(purchases.cost(kind, &self.effective_modifiers()))
    }

    /// Take payment for `kind` and record the purchase. Returns the price paid.
    fn charge(&mut self, kind: UpgradeKind) -> SimResult<u32> {
        let price = self.quote(kind)?;
        require(&mut self.economy, "economy")?.try_spend(price)?;
        require(&mut self.purchases, "purchases")?.record(kind);
        if let Some(stats) = self.stats.as_mut() {
            stats.record_gold_spent(price);
        }
        log::debug!("purchase: {kind} for {price} gold");
        Ok(price)
    }

    // ── Fortification ──────────────────────────────────────────────

    pub fn build_wall(&mut self, position: Vec3, rotation: Quat) -> SimResult<EntityId> {
        if self.walls.is_none() {
            return Err(SimError::ProviderUnavailable { name: "fortification" });
        }
        self.charge(UpgradeKind::NewWall)?;
        let max_health =
            self.effective_modifiers().wall_health(self.config.starting.wall_max_health);
        let id = require(&mut self.walls, "fortification")?
            .place_foundation(position, rotation, max_health);
        if let Some(stats) = self.stats.as_mut() {
            stats.record_wall_built();
        }
        Ok(id)
    }

    pub fn complete_wall(&mut self, id: &str) -> SimResult<bool> {
        Ok(require(&mut self.walls, "fortification")?.complete_construction(id))
    }

    /// Returns the health actually restored.
    pub fn repair_wall(&mut self, id: &str, amount: f32) -> SimResult<f32> {
        let restored = require(&mut self.walls, "fortification")?.repair(id, amount);
        if let Some(stats) = self.stats.as_mut() {
            stats.record_wall_repair(restored);
        }
        Ok(restored)
    }

    /// Returns true if the wall fell.
    pub fn damage_wall(&mut self, id: &str, amount: f32) -> SimResult<bool> {
        let incoming = self.effective_modifiers().incoming_damage(amount);
        Ok(require(&mut self.walls, "fortification")?.damage(id, incoming))
    }

    // ── Ballistas ──────────────────────────────────────────────────

    pub fn build_ballista(&mut self, position: Vec3, rotation: Quat) -> SimResult<EntityId> {
        if self.ballistas.is_none() {
            return Err(SimError::ProviderUnavailable { name: "ballistas" });
        }
        self.charge(UpgradeKind::NewBallista)?;
        let start = &self.config.starting;
        let (damage, fire_rate) = (start.ballista_damage, start.ballista_fire_rate);
        let ballistas = require(&mut self.ballistas, "ballistas")?;
        let id = ballistas.place(position, rotation, damage, fire_rate);
        if ballistas.active().is_none() {
            ballistas.set_active(&id);
        }
        Ok(id)
    }

    /// Buy a ballista upgrade. Only the four ballista kinds are accepted.
    pub fn upgrade_ballista(&mut self, id: &str, kind: UpgradeKind) -> SimResult<()> {
        let known = self.ballistas.as_ref().is_some_and(|b| b.get(id).is_some());
        if !known {
            return Err(SimError::UnknownCatalogEntry { kind: "ballista", id: id.to_string() });
        }
        if !matches!(
            kind,
            UpgradeKind::BallistaDamage
                | UpgradeKind::BallistaFireRate
                | UpgradeKind::BallistaDoubleShot
                | UpgradeKind::BallistaBurningBolts
        ) {
            return Err(SimError::UnknownCatalogEntry {
                kind: "ballista upgrade",
                id: kind.to_string(),
            });
        }

        self.charge(kind)?;
        let damage_step = self.config.starting.ballista_damage_step;
        let fire_rate_step = self.config.starting.ballista_fire_rate_step;
        let ballista = require(&mut self.ballistas, "ballistas")?
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownCatalogEntry { kind: "ballista", id: id.to_string() })?;
        match kind {
            UpgradeKind::BallistaDamage => ballista.damage += damage_step,
            UpgradeKind::BallistaFireRate => ballista.fire_rate += fire_rate_step,
            UpgradeKind::BallistaDoubleShot => ballista.upgrades.double_shot = true,
            _ => ballista.upgrades.burning_bolts = true,
        }
        Ok(())
    }

    pub fn man_ballista(&mut self, id: &str) -> SimResult<bool> {
        Ok(require(&mut self.ballistas, "ballistas")?.set_active(id))
    }

    /// Fire the manned ballista at `target`. Returns loot dropped on a kill.
    pub fn fire_active_ballista(&mut self, target: &str) -> SimResult<Option<u32>> {
        let mods = self.effective_modifiers();
        let damage = self
            .ballistas
            .as_ref()
            .and_then(BallistaRoster::active)
            .map(|b| b.effective_damage(&mods))
            .ok_or(SimError::ProviderUnavailable { name: "active ballista" })?;
        if let Some(stats) = self.stats.as_mut() {
            stats.record_ballista_shot();
        }
        self.damage_enemy(target, damage)
    }

    // ── Units ──────────────────────────────────────────────────────

    pub fn hire_defender(
        &mut self,
        type_id: &str,
        position: Vec3,
        rotation: Quat,
    ) -> SimResult<EntityId> {
        let forbidden_by = self.run_modifiers.as_ref().and_then(RunModifiers::hiring_forbidden_by);
        if let Some(mutator) = forbidden_by {
            return Err(SimError::HiringForbidden { mutator: mutator.to_string() });
        }
        let hire_kind = self
            .config
            .defenders
            .get(type_id)
            .map(|t| t.hire_kind)
            .ok_or_else(|| SimError::UnknownCatalogEntry {
                kind: "defender type",
                id: type_id.to_string(),
            })?;
        if self.defenders.is_none() {
            return Err(SimError::ProviderUnavailable { name: "defenders" });
        }

        self.charge(hire_kind)?;
        let defenders = require(&mut self.defenders, "defenders")?;
        let id = defenders.spawn(type_id, position, rotation)?;
        let alive = defenders.live_count() as u32;
        if let Some(stats) = self.stats.as_mut() {
            stats.record_hire(type_id);
            stats.observe_defenders_alive(alive);
        }
        Ok(id)
    }

    /// Returns true if the defender died.
    pub fn damage_defender(&mut self, id: &str, amount: f32) -> SimResult<bool> {
        let incoming = self.effective_modifiers().incoming_damage(amount);
        Ok(require(&mut self.defenders, "defenders")?.damage(id, incoming).is_some())
    }

    /// Damage per hit and seconds between hits after run modifiers.
    pub fn defender_attack(&self, id: &str) -> Option<(f32, f32)> {
        let mods = self.effective_modifiers();
        let defenders = self.defenders.as_ref()?;
        Some((
            defenders.effective_damage(id, &mods)?,
            defenders.effective_attack_interval(id, &mods)?,
        ))
    }

    pub fn hire_menial(&mut self) -> SimResult<EntityId> {
        if self.menials.is_none() {
            return Err(SimError::ProviderUnavailable { name: "menials" });
        }
        self.charge(UpgradeKind::HireMenial)?;
        let spawn = self.config.starting.menial_spawn;
        let max_health = self.config.starting.menial_max_health;
        let id = require(&mut self.menials, "menials")?.spawn(spawn, max_health);
        self.sync_menial_counters()?;
        if let Some(stats) = self.stats.as_mut() {
            stats.record_menial_hired();
        }
        Ok(id)
    }

    pub fn assign_menial(&mut self, id: &str, task: MenialTask) -> SimResult<bool> {
        let assigned = require(&mut self.menials, "menials")?.assign(id, task);
        self.sync_menial_counters()?;
        Ok(assigned)
    }

    /// Returns true if the menial died.
    pub fn damage_menial(&mut self, id: &str, amount: f32) -> SimResult<bool> {
        let incoming = self.effective_modifiers().incoming_damage(amount);
        let died = require(&mut self.menials, "menials")?.damage(id, incoming).is_some();
        if died {
            self.sync_menial_counters()?;
            if let Some(stats) = self.stats.as_mut() {
                stats.record_menial_lost();
            }
        }
        Ok(died)
    }

    /// Enemy damage grows with every day survived.
    pub fn enemy_damage_scale(&self) -> f32 {
        let day = self.clock.as_ref().map_or(1, |c| c.day);
        1.0 + self.config.starting.enemy_damage_growth_per_day * day.saturating_sub(1) as f32
    }

    pub fn spawn_enemy(
        &mut self,
        kind: &str,
        position: Vec3,
        rotation: Quat,
    ) -> SimResult<EntityId> {
        let scale = self.enemy_damage_scale();
        require(&mut self.enemies, "enemies")?.spawn(kind, position, rotation, scale)
    }

    /// Returns the loot dropped if the hit was lethal.
    pub fn damage_enemy(&mut self, id: &str, amount: f32) -> SimResult<Option<u32>> {
        let Some(slain) = require(&mut self.enemies, "enemies")?.damage(id, amount) else {
            return Ok(None);
        };
        let (base_loot, is_boss) = self
            .config
            .enemies
            .get(&slain.kind)
            .map_or((0, false), |t| (t.loot_value, t.is_boss));
        let value = self.effective_modifiers().loot(base_loot);

        require(&mut self.economy, "economy")?.record_kill();
        if let Some(stats) = self.stats.as_mut() {
            stats.record_kill(&slain.kind, is_boss);
        }
        if value > 0 {
            require(&mut self.loot, "loot")?.drop_at(slain.position, slain.rotation, value);
        }
        log::debug!("combat: {} slain, dropped {value} gold", slain.kind);
        Ok(Some(value))
    }

    pub fn collect_loot(&mut self, id: &str) -> SimResult<u32> {
        let Some(value) = require(&mut self.loot, "loot")?.collect(id) else {
            return Ok(0);
        };
        let earned = self.effective_modifiers().gold_income(value);
        require(&mut self.economy, "economy")?.earn(earned);
        if let Some(stats) = self.stats.as_mut() {
            stats.record_gold_earned(earned);
        }
        Ok(earned)
    }

    // ── Run modifiers ──────────────────────────────────────────────

    /// Returns the synergies this relic completed.
    pub fn collect_relic(&mut self, id: &str) -> SimResult<Vec<String>> {
        let completed = require(&mut self.run_modifiers, "run_modifiers")?.collect_relic(id)?;
        for synergy in &completed {
            log::info!("relics: synergy '{synergy}' activated by '{id}'");
        }
        self.refresh_derived();
        Ok(completed)
    }

    pub fn activate_mutator(&mut self, id: &str) -> SimResult<()> {
        require(&mut self.run_modifiers, "run_modifiers")?.activate_mutator(id)?;
        self.refresh_derived();
        Ok(())
    }
}
