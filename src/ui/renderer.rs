/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Projection
/// The 800×600 px world maps onto an 80×30 cell grid (10×20 px per cell),
/// drawn below a one-row HUD at the top-left of the terminal. A one-cell
/// platform row sits at `round(top / 20)`; a two-row actor whose centre is
/// `y` covers rows `floor((y-10)/20)` and `floor((y+10)/20)`, so feet
/// resting on a platform land on the row just above it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{EnemyKind, GemColor, Pose};
use crate::domain::geom::Rect;
use crate::domain::metrics::{AssetDimensions, Size};
use crate::domain::physics::is_floor;
use crate::sim::level;
use crate::sim::world::{GameState, GameWorld};
use crate::ui::menu;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so gaps
    /// between rows match the cell colour on every terminal.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: i32, s: &str, fg: Color, bg: Color) {
        let x = (VIEW_COLS as i32 - s.chars().count() as i32) / 2;
        self.put_str(x.max(0), y, s, fg, bg);
    }

    fn fill_row(&mut self, y: i32, x0: i32, x1: i32, bg: Color) {
        for x in x0..x1 {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

pub const VIEW_COLS: usize = 80;
pub const VIEW_ROWS: usize = 30;
const PX_PER_COL: f32 = 10.0;
const PX_PER_ROW: f32 = 20.0;
const HUD_ROW: i32 = 0;
const WORLD_ROW: i32 = 1;
const HELP_ROW: i32 = WORLD_ROW + VIEW_ROWS as i32;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HILITE_BG: Color = Color::Rgb { r: 60, g: 120, b: 60 };
const BUTTON_BG: Color = Color::Rgb { r: 50, g: 50, b: 80 };
const HINT_FG: Color = Color::Rgb { r: 255, g: 230, b: 120 };

fn col_of(x: f32) -> i32 {
    (x / PX_PER_COL).floor() as i32
}

fn row_of(y: f32) -> i32 {
    WORLD_ROW + (y / PX_PER_ROW).floor() as i32
}

/// Head and feet rows of an actor centred at `y`.
fn actor_rows(y: f32) -> (i32, i32) {
    (row_of(y - PX_PER_ROW / 2.0), row_of(y + PX_PER_ROW / 2.0))
}

fn platform_row(p: &Rect) -> i32 {
    WORLD_ROW + (p.top / PX_PER_ROW).round() as i32
}

fn sky(background: &str) -> Color {
    match background {
        "background_color_desert" => Color::Rgb { r: 62, g: 48, b: 30 },
        "background_color_mushrooms" => Color::Rgb { r: 44, g: 28, b: 54 },
        "background_clouds" => Color::Rgb { r: 30, g: 44, b: 72 },
        _ => Color::Rgb { r: 24, g: 42, b: 34 },
    }
}

fn gem_color(c: GemColor) -> Color {
    match c {
        GemColor::Blue => Color::Rgb { r: 80, g: 160, b: 255 },
        GemColor::Red => Color::Rgb { r: 255, g: 70, b: 70 },
        GemColor::Green => Color::Rgb { r: 80, g: 230, b: 110 },
        GemColor::Yellow => Color::Rgb { r: 255, g: 220, b: 60 },
    }
}

fn enemy_color(k: EnemyKind) -> Color {
    match k {
        EnemyKind::Pink => Color::Rgb { r: 255, g: 120, b: 180 },
        EnemyKind::Beige => Color::Rgb { r: 220, g: 200, b: 150 },
        EnemyKind::Purple => Color::Rgb { r: 170, g: 100, b: 230 },
    }
}

// ── Hearts ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heart {
    Full,
    Half,
    Empty,
}

/// Health in half-heart units → one entry per heart container.
pub fn hearts(health: u32, max_health: u32) -> Vec<Heart> {
    (0..max_health.div_ceil(2))
        .map(|i| match health.saturating_sub(i * 2) {
            0 => Heart::Empty,
            1 => Heart::Half,
            _ => Heart::Full,
        })
        .collect()
}

// ── Built-in sprite table ──

/// Pixel sizes of the sprites this front end draws. Unknown ids resolve
/// to `None` and the metrics fall back to their defaults.
pub struct SpriteTable;

const SPRITES: &[(&str, Size)] = &[
    ("player/idle", Size::new(40.0, 40.0)),
    ("items/door_closed", Size::new(48.0, 80.0)),
    ("items/key_blue", Size::new(24.0, 24.0)),
    ("items/key_red", Size::new(24.0, 24.0)),
    ("items/key_green", Size::new(24.0, 24.0)),
    ("items/key_yellow", Size::new(24.0, 24.0)),
    ("enemies/character_pink_idle", Size::new(40.0, 40.0)),
    ("enemies/character_beige_idle", Size::new(40.0, 40.0)),
    ("enemies/character_purple_idle", Size::new(40.0, 40.0)),
];

impl AssetDimensions for SpriteTable {
    fn try_load_dimensions(&self, id: &str) -> Option<Size> {
        SPRITES.iter().find(|(name, _)| *name == id).map(|(_, size)| *size)
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_state: Option<GameState>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_state: None,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((VIEW_COLS as u16, VIEW_ROWS as u16 + 2));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &GameWorld) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((self.term_w as u16, self.term_h as u16));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // State change → clean repaint.
        if self.last_state != Some(world.state) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_state = Some(world.state);
        }

        self.front.clear();
        compose(&mut self.front, world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, w: &GameWorld) {
    match w.state {
        GameState::Playing => {
            compose_world(buf, w);
            compose_hud(buf, w);
            buf.put_str(
                0, HELP_ROW,
                " ←→/AD walk  ↑/W jump (x2)  ↓/S drop  SPACE door  M music  ESC menu",
                Color::DarkGrey, Cell::BASE_BG,
            );
        }
        GameState::Menu => compose_menu(buf, w),
        GameState::Tutorial => compose_tutorial(buf, w),
        GameState::GameOver => compose_game_over(buf, w),
        GameState::Victory => compose_victory(buf, w),
    }
}

fn compose_world(buf: &mut FrameBuffer, w: &GameWorld) {
    let bg = level::level(w.current_level).map(|l| sky(l.background)).unwrap_or(Cell::BASE_BG);
    for row in WORLD_ROW..WORLD_ROW + VIEW_ROWS as i32 {
        buf.fill_row(row, 0, VIEW_COLS as i32, bg);
    }

    // ── Platforms ──
    for p in &w.platforms {
        let row = platform_row(p);
        let (glyph, fg) = if is_floor(p) {
            ('▓', Color::Rgb { r: 70, g: 150, b: 60 })
        } else {
            ('▀', Color::Rgb { r: 160, g: 110, b: 60 })
        };
        for col in col_of(p.left)..col_of(p.right() - 0.01) + 1 {
            buf.set(col, row, Cell::new(glyph, fg, bg));
        }
    }

    // ── Door ──
    if w.door.visible {
        let half = w.metrics.door_half;
        let (c0, c1) = (col_of(w.door.pos.x - half.w), col_of(w.door.pos.x + half.w - 0.01));
        let (r0, r1) = (row_of(w.door.pos.y - half.h), row_of(w.door.pos.y + half.h - 0.01));
        let frame = Color::Rgb { r: 190, g: 150, b: 90 };
        let fill = if w.door.open { ' ' } else { '▒' };
        for r in r0..=r1 {
            for c in c0..=c1 {
                let edge = c == c0 || c == c1 || r == r0;
                let ch = match (edge, r == r0, c == c0, c == c1) {
                    (true, true, true, _) => '┌',
                    (true, true, _, true) => '┐',
                    (true, true, _, _) => '─',
                    (true, false, _, _) => '│',
                    _ => fill,
                };
                buf.set(c, r, Cell::new(ch, frame, bg));
            }
        }
    }

    // ── Key ──
    if w.key.visible {
        buf.set(col_of(w.key.pos.x), row_of(w.key.pos.y), Cell::new('⚷', gem_color(w.key.color), bg));
    }

    // ── Gems ──
    for g in &w.gems {
        buf.set(col_of(g.pos.x), row_of(g.pos.y), Cell::new('◆', gem_color(g.color), bg));
    }

    // ── Enemies ──
    for e in &w.enemies {
        let (head, feet) = actor_rows(e.pos.y);
        let c = col_of(e.pos.x);
        let fg = enemy_color(e.kind);
        buf.set(c, head, Cell::new('▲', fg, bg));
        buf.set(c, feet, Cell::new(if e.walk_frame_b() { 'n' } else { 'm' }, fg, bg));
    }

    // ── Player ──
    let p = &w.player;
    let (head, feet) = actor_rows(p.pos.y);
    let c = col_of(p.pos.x);
    let fg = Color::Rgb { r: 120, g: 255, b: 255 };
    let body = match p.pose {
        Pose::Idle => 'Λ',
        Pose::WalkA => '/',
        Pose::WalkB => '\\',
        Pose::Jump => 'Y',
    };
    buf.set(c, head, Cell::new('☻', fg, bg));
    buf.set(c, feet, Cell::new(body, fg, bg));
}

fn compose_hud(buf: &mut FrameBuffer, w: &GameWorld) {
    buf.fill_row(HUD_ROW, 0, VIEW_COLS as i32, HUD_BG);

    let mut x = 1;
    for heart in hearts(w.player.health, w.tuning.max_health) {
        let (ch, fg) = match heart {
            Heart::Full => ('♥', Color::Rgb { r: 255, g: 60, b: 80 }),
            Heart::Half => ('♥', Color::Rgb { r: 140, g: 50, b: 70 }),
            Heart::Empty => ('♡', Color::DarkGrey),
        };
        buf.set(x, HUD_ROW, Cell::new(ch, fg, HUD_BG));
        x += 1;
    }

    let key = if w.progress.has_key { "Key ✓" } else { "Key ·" };
    let music = if w.music_enabled { "♪ On" } else { "♪ Off" };
    let text = format!(
        "  Level {}  Gems {}/{}  {}  {}",
        w.current_level + 1, w.progress.collected, w.progress.total, key, music,
    );
    buf.put_str(x, HUD_ROW, &text, Color::White, HUD_BG);

    if w.near_door && w.door.visible {
        let hint = "Press SPACE to enter ";
        let hx = VIEW_COLS as i32 - hint.chars().count() as i32;
        buf.put_str(hx, HUD_ROW, hint, HINT_FG, HUD_BG);
    }
}

fn compose_buttons(buf: &mut FrameBuffer, w: &GameWorld) {
    for (i, b) in menu::buttons(w).iter().enumerate() {
        let active = w.hover == Some(i) || (w.hover.is_none() && w.menu_cursor == i);
        let bg = if active { HILITE_BG } else { BUTTON_BG };
        let (x, y, width) = (b.col as i32, b.row as i32, b.width as i32);
        buf.fill_row(y, x, x + width, bg);
        let lx = x + (width - b.label.chars().count() as i32) / 2;
        buf.put_str(lx, y, &b.label, Color::White, bg);
        if active {
            buf.set(x + 1, y, Cell::new('▸', Color::White, bg));
        }
    }
}

fn compose_menu(buf: &mut FrameBuffer, w: &GameWorld) {
    let title = [
        r" ___                       ___              _   ",
        r"| __|_ _  ___ _ _ __ _ _  _/ _ \ _  _  ___ __| |_ ",
        r"| _|| ' \/ -_) '_/ _` | || | (_) | || |/ -_|_-<  _|",
        r"|___|_||_\___|_| \__, |\_, |\__\_\\_,_|\___/__/\__|",
        r"                 |___/ |__/                        ",
    ];
    for (i, line) in title.iter().enumerate() {
        buf.put_centered(3 + i as i32, line, TITLE_FG, Cell::BASE_BG);
    }
    buf.put_centered(10, "Collect every gem, grab the key, reach the door.", Color::Grey, Cell::BASE_BG);
    compose_buttons(buf, w);
    buf.put_centered(23, "mouse or ↑↓ + ENTER   Q quits", Color::DarkGrey, Cell::BASE_BG);
}

fn compose_tutorial(buf: &mut FrameBuffer, w: &GameWorld) {
    let lines = [
        ("How to play", TITLE_FG),
        ("", Color::White),
        ("←/→ or A/D      walk", Color::White),
        ("↑ or W          jump, press again in the air to double jump", Color::White),
        ("↓ or S          drop through the platform you stand on", Color::White),
        ("SPACE           open the door", Color::White),
        ("M               music on/off", Color::White),
        ("ESC             back to the menu", Color::White),
        ("", Color::White),
        ("Collect every gem ◆ to make the key ⚷ appear.", Color::Grey),
        ("Take the key to reveal the door, then open it.", Color::Grey),
        ("Enemies cost a heart per touch. Lose them all and it's over.", Color::Grey),
    ];
    for (i, (text, fg)) in lines.iter().enumerate() {
        buf.put_str(8, 4 + i as i32, text, *fg, Cell::BASE_BG);
    }
    compose_buttons(buf, w);
}

fn compose_game_over(buf: &mut FrameBuffer, w: &GameWorld) {
    let box_art = [
        "╔══════════════════════════════╗",
        "║          GAME  OVER          ║",
        "╚══════════════════════════════╝",
    ];
    for (i, l) in box_art.iter().enumerate() {
        buf.put_centered(4 + i as i32, l, Color::Rgb { r: 255, g: 60, b: 60 }, Cell::BASE_BG);
    }
    let reached = format!("Reached level {} of {}", w.current_level + 1, level::level_count());
    buf.put_centered(9, &reached, Color::White, Cell::BASE_BG);
    compose_buttons(buf, w);
}

fn compose_victory(buf: &mut FrameBuffer, w: &GameWorld) {
    let box_art = [
        "╔══════════════════════════════╗",
        "║   ★  ALL LEVELS CLEARED  ★   ║",
        "╚══════════════════════════════╝",
    ];
    for (i, l) in box_art.iter().enumerate() {
        buf.put_centered(4 + i as i32, l, TITLE_FG, Cell::BASE_BG);
    }
    buf.put_centered(9, "Congratulations!", Color::Rgb { r: 80, g: 255, b: 80 }, Cell::BASE_BG);
    compose_buttons(buf, w);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::SpriteMetrics;
    use crate::sim::flow;

    fn frame(w: &GameWorld) -> FrameBuffer {
        let mut buf = FrameBuffer::new(VIEW_COLS, VIEW_ROWS + 2);
        compose(&mut buf, w);
        buf
    }

    #[test]
    fn hearts_split_into_halves() {
        use Heart::*;
        assert_eq!(hearts(6, 6), vec![Full, Full, Full]);
        assert_eq!(hearts(5, 6), vec![Full, Full, Half]);
        assert_eq!(hearts(2, 6), vec![Full, Empty, Empty]);
        assert_eq!(hearts(0, 6), vec![Empty, Empty, Empty]);
        assert_eq!(hearts(3, 5), vec![Full, Half, Empty]);
    }

    #[test]
    fn sprite_table_feeds_metrics() {
        let m = SpriteMetrics::resolve(&SpriteTable);
        assert_eq!(m.player_half, Size::new(20.0, 20.0));
        assert_eq!(m.door_half, Size::new(24.0, 40.0));
        assert_eq!(m.key_half(GemColor::Yellow), Size::new(12.0, 12.0));
        assert!(SpriteTable.try_load_dimensions("items/key_purple").is_none());
    }

    #[test]
    fn standing_actor_sits_just_above_its_platform() {
        for top in [260.0, 280.0, 350.0, 390.0, 420.0, 430.0, 450.0, 460.0, 470.0, 580.0] {
            let p = Rect::new(0.0, top, 100.0, 20.0);
            let (head, feet) = actor_rows(top - 18.0);
            assert_eq!(feet + 1, platform_row(&p), "top {top}");
            assert_eq!(head + 1, feet);
        }
    }

    #[test]
    fn hud_shows_level_gems_and_music() {
        let mut w = GameWorld::with_seed(4);
        flow::start_game(&mut w, &mut vec![]);
        let hud = frame(&w).row_text(0);
        assert!(hud.contains("Level 1"), "{hud}");
        assert!(hud.contains("Gems 0/3"), "{hud}");
        assert!(hud.contains("♪ On"), "{hud}");
        assert_eq!(hud.chars().filter(|&c| c == '♥').count(), 3);
    }

    #[test]
    fn door_hint_needs_visible_door() {
        let mut w = GameWorld::with_seed(4);
        flow::start_game(&mut w, &mut vec![]);
        w.near_door = true;
        assert!(!frame(&w).row_text(0).contains("SPACE"));
        w.door.visible = true;
        assert!(frame(&w).row_text(0).contains("Press SPACE to enter"));
    }

    #[test]
    fn menu_lists_buttons() {
        let w = GameWorld::with_seed(0);
        let buf = frame(&w);
        let all: String = (0..buf.height).map(|y| buf.row_text(y)).collect::<Vec<_>>().join("\n");
        for label in ["Start", "How to play", "Music: On", "Quit"] {
            assert!(all.contains(label), "missing {label}");
        }
    }

    #[test]
    fn player_glyph_drawn_at_spawn() {
        let mut w = GameWorld::with_seed(4);
        flow::start_game(&mut w, &mut vec![]);
        let buf = frame(&w);
        let (head, _) = actor_rows(w.player.pos.y);
        assert_eq!(buf.get(col_of(w.player.pos.x) as usize, head as usize).ch, '☻');
    }
}
