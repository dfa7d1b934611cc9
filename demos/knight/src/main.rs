//! # knight: save/load walkthrough
//!
//! Plays a short scripted session and round-trips it through a save file:
//!
//! 1. Start a new game in the meadow and spawn the player's knight.
//! 2. Open the meadow chest and fire an arrow.
//! 3. Walk the knight to the castle and switch scenes.
//! 4. Save the game to disk (first argument, default: the temp directory).
//! 5. Load the file into a fresh session and return to the meadow.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use persist_math::Vec3;
use persist_scene::SceneOrchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use knight::components::{Chest, CombatStats};
use knight::values::ArrowDamage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("knight=info".parse()?)
                .add_directive("persist_scene=info".parse()?),
        )
        .init();

    let save_path = std::env::args()
        .nth(1)
        .map_or_else(|| std::env::temp_dir().join("knight.sav"), PathBuf::from);

    let mut game = SceneOrchestrator::new(knight::host()?, knight::world()?);
    game.start_fresh("meadow").await?;

    let player = game
        .spawn("Knight", None)?
        .context("the Knight template is missing")?;
    let chest = game
        .world()
        .find_by_stable_id("chest_01")
        .context("the meadow has no chest_01")?;
    game.world_mut()
        .component_mut::<Chest>(chest)
        .context("chest_01 has no Chest component")?
        .opened = true;
    info!(entity = %chest, "opened chest");

    let arrow = game
        .spawn("Arrow", None)?
        .context("the Arrow template is missing")?;
    knight::fire_arrow(
        game.world_mut(),
        arrow,
        Vec3::X,
        6.0,
        Arc::new(ArrowDamage::new(12.5)),
    )?;
    info!(entity = %arrow, "fired arrow");

    game.move_entity(player, "castle")?;
    game.switch_scene("castle").await?;

    let bytes = game.save_to_bytes()?;
    tokio::fs::write(&save_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", save_path.display()))?;
    info!(path = %save_path.display(), bytes = bytes.len(), "wrote save file");

    let bytes = tokio::fs::read(&save_path)
        .await
        .with_context(|| format!("failed to read {}", save_path.display()))?;
    let mut restored = SceneOrchestrator::new(knight::host()?, knight::world()?);
    restored.load_from_bytes(&bytes).await?;

    let player = restored
        .world()
        .roots()
        .iter()
        .copied()
        .find(|&id| restored.world().template_id(id) == Some("Knight"))
        .context("the knight did not survive the round trip")?;
    let health = restored
        .world()
        .component::<CombatStats>(player)
        .map(|stats| stats.current_health);
    info!(
        scene = ?restored.active_scene(),
        entities = restored.world().len(),
        health = ?health,
        "restored game"
    );

    restored.switch_scene("meadow").await?;
    let arrows = restored
        .world()
        .roots()
        .iter()
        .filter(|&&id| restored.world().template_id(id) == Some("Arrow"))
        .count();
    info!(entities = restored.world().len(), arrows, "back in the meadow");
    Ok(())
}
