//! Headless frame loop: movement against a walled tilemap, projectiles
//! tested with SAT against enemies, depth-sorted sprites batched into a sink
//! that logs every submission.
//!
//! Run with `RUST_LOG=debug cargo run -p ormr --example frame_loop [config.json]`.

use ormr::prelude::*;
use ormr::render2d::Batch;

const FRAME_COUNT: usize = 90;
const DISPLAY: IVec2 = IVec2::new(640, 360);

#[derive(Debug, Clone, Copy)]
enum Sprite {
    Player,
    Enemy,
    Projectile,
    Wall,
}

impl SpriteKey for Sprite {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct Enemy {
    pos: Vec2,
    hp: i32,
}

#[derive(Debug, Default)]
struct Projectile {
    pos: Vec2,
    vel: Vec2,
    rot: f32,
}

/// Logs each batch instead of drawing it.
#[derive(Default)]
struct LogSink {
    frame_batches: usize,
}

impl BatchSink for LogSink {
    fn clear(&mut self, color: Color) {
        log::debug!("clear {:?}", color.to_array());
    }

    fn submit(&mut self, batch: &Batch<'_>) {
        self.frame_batches += 1;
        log::debug!("batch: texture {} with {} quads", batch.texture.index(), batch.quad_count());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut mem = FrameMemory::new(config.perm_arena_size, config.temp_arena_size)?;

    // Level: walls around the border and a pillar in the middle.
    let mut tilemap = Tilemap::new(config.tilemap);
    let (w, h) = (tilemap.width(), tilemap.height());
    for x in 0..w {
        tilemap.activate_tile(x, 0);
        tilemap.activate_tile(x, h - 1);
    }
    for y in 0..h {
        tilemap.activate_tile(0, y);
        tilemap.activate_tile(w - 1, y);
    }
    for y in 10..14 {
        for x in 10..14 {
            tilemap.activate_tile(x, y);
        }
    }

    let mut textures = Textures::new();
    let atlas = textures.add(IVec2::new(64, 64));
    let sprites = SpriteTable::<Sprite>::new(vec![
        SpriteDef::new(atlas, RectI::new(8, 0, 24, 40)),
        SpriteDef::new(atlas, RectI::new(32, 0, 24, 32)),
        SpriteDef::new(atlas, RectI::new(0, 0, 8, 8)),
        SpriteDef::new(atlas, RectI::new(0, 48, 16, 16)),
    ]);

    let mut enemies = Pool::<Enemy>::new(32);
    for i in 0..6 {
        let pos = Vec2::new(260.0 + 40.0 * i as f32, 120.0 + 24.0 * (i % 3) as f32);
        enemies.spawn(Enemy { pos, hp: 3 })?;
    }
    let mut projectiles = Pool::<Projectile>::new(64);

    let mut player = Vec2::new(64.0, 64.0);
    let mut camera = Camera2d::new(player, 2.0);
    let mut renderer = BatchRenderer::new(LogSink::default(), config.batch_slot_count);

    for frame in 0..FRAME_COUNT {
        // Player walks diagonally and gets stopped by the pillar.
        let collider = sprites.collider_rect(Sprite::Player, player, Vec2::splat(0.5));
        player += tilemap.resolve_collisions(Vec2::new(2.0, 1.5), &collider);
        camera.pos = lerp_vec(camera.pos, player, 0.25);

        if frame % 8 == 0 {
            let target = enemies.iter().next().map_or(player + Vec2::X, |(_, e)| e.pos);
            let rot = dir(target - player);
            let projectile = Projectile {
                pos: player,
                vel: len_dir(6.0, rot),
                rot,
            };
            if projectiles.spawn(projectile).is_err() {
                log::warn!("frame {frame}: projectile dropped");
            }
        }

        update_projectiles(&mut mem.temp, &tilemap, &sprites, &mut enemies, &mut projectiles);

        // Render
        renderer.begin_frame();
        renderer.clear(Color::rgb(0.2, 0.3, 0.4));
        renderer.set_view(camera.view_matrix(DISPLAY));

        tilemap.render(&mut renderer, &textures, sprites.get(Sprite::Wall));

        let mut tasks = RenderTaskList::new();
        let player_def = sprites.get(Sprite::Player);
        tasks.append(player, Sprite::Player, player.y + player_def.size().y / 2.0)?;
        for (_, enemy) in enemies.iter() {
            let depth = enemy.pos.y + sprites.get(Sprite::Enemy).size().y / 2.0;
            tasks.append(enemy.pos, Sprite::Enemy, depth)?;
        }
        for (_, p) in projectiles.iter() {
            tasks.append_extended(RenderTask {
                rot: p.rot,
                ..RenderTask::new(p.pos, Sprite::Projectile, p.pos.y)
            })?;
        }
        tasks.sort_and_flush(&mut renderer, &sprites, &textures);

        // UI
        renderer.set_view(Mat4::IDENTITY);
        let alive = enemies.len() as f32 / enemies.capacity() as f32;
        renderer.draw_bar_hor(
            &Rect::new(8.0, 8.0, 120.0, 8.0),
            alive,
            ColorRgb::new(0.9, 0.2, 0.2),
            ColorRgb::new(0.1, 0.1, 0.1),
        );
        renderer.flush();

        let stats = renderer.stats();
        log::info!(
            "frame {frame}: {} batches ({} draw calls), {} quads, {} enemies, {} projectiles, {} temp bytes",
            renderer.sink().frame_batches,
            stats.draw_calls,
            stats.quads,
            enemies.len(),
            projectiles.len(),
            mem.temp.offset(),
        );
        renderer.sink_mut().frame_batches = 0;

        mem.end_frame();
    }

    Ok(())
}

fn update_projectiles(
    temp: &mut MemArena,
    tilemap: &Tilemap,
    sprites: &SpriteTable<Sprite>,
    enemies: &mut Pool<Enemy>,
    projectiles: &mut Pool<Projectile>,
) {
    let center = Vec2::splat(0.5);

    let mut enemy_polys = Vec::with_capacity(enemies.len());
    for (index, enemy) in enemies.iter() {
        match sprites.push_collider_poly(Sprite::Enemy, temp, enemy.pos, center, 0.0) {
            Some(poly) => enemy_polys.push((index, poly)),
            None => log::warn!("temp arena full; enemy {index} is not hittable this frame"),
        }
    }

    let mut spent = Vec::new();
    let mut hits = Vec::new();

    for (index, p) in projectiles.iter_mut() {
        p.pos += p.vel;

        if tilemap.collides_with(&sprites.collider_rect(Sprite::Projectile, p.pos, center)) {
            spent.push(index);
            continue;
        }

        let Some(poly) = sprites.push_collider_poly(Sprite::Projectile, temp, p.pos, center, p.rot) else {
            continue;
        };

        let hit = enemy_polys
            .iter()
            .find(|(_, enemy)| polys_intersect(poly.view(temp), enemy.view(temp)));
        if let Some(&(enemy, _)) = hit {
            hits.push(enemy);
            spent.push(index);
        }
    }

    for index in spent {
        projectiles.release(index);
    }
    for index in hits {
        if let Some(enemy) = enemies.get_mut(index) {
            enemy.hp -= 1;
        }
    }
    enemies.release_where(|e| e.hp <= 0);
}
