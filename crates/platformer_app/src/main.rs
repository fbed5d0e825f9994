//! # platformer_app
//!
//! Headless host for the platformer runtime.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `platformer_app=info,platformer_core=info`).
//! 2. Create every resource from the asset directory. Any error aborts.
//! 3. Run the fixed-rate frame loop. Frame errors are logged and skipped.

mod frame_loop;
mod host;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use frame_loop::{FrameLoop, FrameLoopConfig};
use host::{CountingSurface, InternedImages};
use platformer_core::{DirectorySource, Game, GameConfig};

#[derive(Parser, Debug)]
#[command(name = "platformer_app", about = "Run the platformer core without a window")]
struct Args {
    /// Directory that holds the `asset/` tree
    #[arg(short, long, default_value = ".")]
    assets: PathBuf,

    /// Number of frames to run (0 runs forever)
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Target frames per second
    #[arg(short, long, default_value_t = 60.0)]
    rate: f64,

    /// Hold jump on this frame
    #[arg(long)]
    jump_at: Option<u64>,

    /// Grid file of the starting level, relative to the asset directory
    #[arg(long)]
    level: Option<String>,
}

impl Args {
    fn frame_loop_config(&self) -> FrameLoopConfig {
        FrameLoopConfig {
            frame_rate: self.rate,
            max_frames: self.frames,
        }
    }

    fn game_config(&self) -> GameConfig {
        let mut config = GameConfig::default();
        config.assets.level = self.level.clone();
        config
    }
}

/// Create resources and run the frame loop. Returns the loop and the
/// surface for reporting.
fn run(
    assets: &Path,
    game_config: GameConfig,
    loop_config: FrameLoopConfig,
    jump_at: Option<u64>,
) -> Result<(Game, FrameLoop, CountingSurface)> {
    let source = DirectorySource::new(assets);
    let mut images = InternedImages::new(&source);
    let mut game = Game::new(game_config);
    game.create_resources(&source, &mut images)
        .with_context(|| format!("failed to create resources from {}", assets.display()))?;
    info!(images = images.len(), objects = game.db().len(), "resources ready");

    let mut surface = CountingSurface::default();
    let mut frames = FrameLoop::new(loop_config).with_jump_at(jump_at);
    frames.run(&mut game, &mut surface);
    Ok((game, frames, surface))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platformer_app=info,platformer_core=info".into()),
        )
        .init();

    let args = Args::parse();
    info!(assets = %args.assets.display(), "platformer starting");

    let (game, frames, surface) = run(
        &args.assets,
        args.game_config(),
        args.frame_loop_config(),
        args.jump_at,
    )?;

    info!(
        frames = frames.frame(),
        failed = frames.failed(),
        images = surface.images,
        lines = surface.lines,
        "platformer shut down"
    );
    if let Ok(player) = game.db().player() {
        let position = player.body().position();
        info!(x = position.x, y = position.y, state = player.state(), "final player state");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(root: &Path, path: &str, contents: &[u8]) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }

    fn asset_tree(root: &Path) {
        for name in ["idle", "walk", "run", "fall"] {
            write(
                root,
                &format!("asset/sprite/test/{name}.sdf"),
                format!("str key {name}\nfile path asset/sprite/test/{name}\nbyte length 2\nbool directional true\n")
                    .as_bytes(),
            );
            for frame in ["0", "1", "0L", "1L"] {
                write(root, &format!("asset/sprite/test/{name}{frame}.png"), b"png");
            }
        }
        write(
            root,
            "asset/sprite/testplayer.ssf",
            b"byte states 4\nsprite state0 core:idle\nsprite state1 core:walk\nsprite state2 core:run\nsprite state3 core:fall\n",
        );
        write(root, "asset/texture/default/ground.png", b"png");
        write(root, "asset/texture/default/grass.png", b"png");
        write(root, "asset/tile/default/ground.dat", b"texture image core:ground\nint behavior 1\n");
        write(root, "asset/tile/default/grass.dat", b"texture image 0:grass\nint behavior 1\n");
        write(
            root,
            "asset/testcontrols.dat",
            b"float movement 0.5\nfloat forcejumpx 1\nfloat gravity 1\nfloat forcejumpy 12\nfloat friction 0.8\n",
        );
        write(root, "asset/level/start.lvl", &[0, 3, 0, 1, 1, 2, 0]);
    }

    #[test]
    fn test_headless_run_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        asset_tree(dir.path());
        let mut config = GameConfig::default();
        config.assets.level = Some("asset/level/start.lvl".to_string());

        let (game, frames, surface) = run(
            dir.path(),
            config,
            FrameLoopConfig {
                frame_rate: 1000.0,
                max_frames: 40,
            },
            Some(35),
        )
        .unwrap();

        assert_eq!(frames.frame(), 40);
        assert_eq!(frames.failed(), 0);
        assert_eq!(surface.lines, 40);
        assert!(surface.images >= 40);
        assert!(game.db().level().is_ok());
        // Jumped off the floor on frame 35.
        assert!(game.db().player().unwrap().body().position().y < 452.0);
    }

    #[test]
    fn test_missing_assets_abort() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(dir.path(), GameConfig::default(), FrameLoopConfig::default(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["platformer_app", "--assets", "data", "--frames", "10", "--jump-at", "3"]);
        assert_eq!(args.assets, PathBuf::from("data"));
        assert_eq!(args.frame_loop_config().max_frames, 10);
        assert_eq!(args.jump_at, Some(3));
        assert_eq!(args.game_config().assets.level, None);
    }
}
