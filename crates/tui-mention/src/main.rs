//! TUI 提及补全演示
//!
//! 使用 crossterm 和 ratatui 构建的终端编辑器，演示 `mention-core` 的 `@` 提及补全：
//! 输入分隔符（默认 `@`）加查询文本后弹出候选下拉框，可用键盘或鼠标选择并插入。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p tui-mention -- [candidates.json] [options.json]
//! ```
//!
//! - `candidates.json`：候选数组，例如 `[{"text": "alice", "url": "https://example.org/alice"}]`；
//!   除 `text` 外的字段原样传给插入操作
//! - `options.json`：`SuggestionOptions`，例如 `{"separator": "#", "case_sensitive": true}`
//!
//! # 日志（可选）
//!
//! 终端被界面占用，日志写入文件：
//!
//! ```bash
//! TUI_MENTION_LOG=mention.log RUST_LOG=mention_core=trace cargo run -p tui-mention
//! ```
//!
//! 未设置 `RUST_LOG` 时使用 `tui_mention=info,mention_core=debug`。
//!
//! # 快捷键
//!
//! - `@` + 文本: 触发提及补全
//! - ↑/↓: 在下拉框中选择（循环）
//! - Enter: 插入选中的候选（下拉框关闭时插入换行）
//! - Esc: 关闭下拉框
//! - 鼠标: 悬停高亮，点击插入；点击编辑区其他位置关闭下拉框并移动光标
//! - 方向键/Home/End: 移动光标
//! - Backspace: 删除字符
//! - Ctrl+Q / Ctrl+X: 退出

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mention_core::{
    BlockDocument, DROPDOWN_INSET, DecoratorEvent, DropdownPosition, EditorState, Key,
    KeyEvent as PopupKeyEvent, MentionCandidate, MentionError, MentionSuggestion, PopupServices,
    Rect as PxRect, SuggestionConfig, SuggestionOptions,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    env, fs,
    io::{self, stdout},
    process,
    rc::Rc,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 日志文件路径的环境变量
const LOG_ENV: &str = "TUI_MENTION_LOG";
const DEFAULT_LOG_FILTER: &str = "tui_mention=info,mention_core=debug";

// 布局测量使用的“像素”：一个终端单元格按 8x16 计
const CELL_WIDTH_PX: f32 = 8.0;
const CELL_HEIGHT_PX: f32 = 16.0;

/// 下拉框最多显示的行数
const DROPDOWN_MAX_ROWS: usize = 6;
const DROPDOWN_MIN_WIDTH: u16 = 12;

type Mentions = MentionSuggestion<BlockDocument, MentionCandidate>;

fn init_tracing() -> io::Result<()> {
    let Ok(path) = env::var(LOG_ENV) else {
        return Ok(());
    };
    let file = fs::File::create(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)
}

fn default_candidates() -> Vec<MentionCandidate> {
    let value = json!([
        { "text": "alice", "url": "https://example.org/alice" },
        { "text": "albert", "url": "https://example.org/albert" },
        { "text": "alfred", "url": "https://example.org/alfred" },
        { "text": "bob", "url": "https://example.org/bob" },
        { "text": "carol", "url": "https://example.org/carol" },
        { "text": "张伟", "url": "https://example.org/zhangwei" },
        { "text": "王芳", "url": "https://example.org/wangfang" },
    ]);
    serde_json::from_value(value).unwrap_or_default()
}

/// 插入操作：把光标前的“分隔符 + 查询”替换为“分隔符 + 候选文本 + 空格”。
fn insert_mention(
    mut state: BlockDocument,
    on_change: &dyn Fn(BlockDocument),
    separator: &str,
    candidate: &MentionCandidate,
) {
    let Some(block) = state.focused_block() else {
        return;
    };
    let key = block.key().clone();
    let caret = state.selection().focus_offset;
    let prefix: String = block.text().chars().take(caret).collect();
    // 没有分隔符时查询从块首开始
    let start = prefix
        .rfind(separator)
        .map(|byte| prefix[..byte].chars().count())
        .unwrap_or(0);

    let mention = format!("{separator}{} ", candidate.text);
    if state.replace_range(&key, start..caret, &mention).is_some() {
        tracing::info!(
            target: "tui_mention",
            text = %candidate.text,
            url = ?candidate.field("url"),
            "mention inserted"
        );
        on_change(state);
    }
}

fn popup_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        _ => Key::Other,
    }
}

fn to_px(area: Rect) -> PxRect {
    PxRect::new(
        f32::from(area.x) * CELL_WIDTH_PX,
        f32::from(area.y) * CELL_HEIGHT_PX,
        f32::from(area.width) * CELL_WIDTH_PX,
        f32::from(area.height) * CELL_HEIGHT_PX,
    )
}

fn cells_x(px: f32) -> i32 {
    (px / CELL_WIDTH_PX).round() as i32
}

fn cells_y(px: f32) -> i32 {
    (px / CELL_HEIGHT_PX).round() as i32
}

fn byte_at(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// 按字符偏移把文本切成 (前, 中, 后) 三段
fn split_at_chars(text: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let start = byte_at(text, start);
    let end = byte_at(text, end).max(start);
    (&text[..start], &text[start..end], &text[end..])
}

fn prefix_width(text: &str, offset: usize) -> usize {
    text[..byte_at(text, offset)].width()
}

/// 列数或行数转为终端坐标，超出 `u16` 时取最大值
fn to_cells(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

/// 屏幕列（相对行首）对应的字符偏移
fn offset_for_column(text: &str, column: usize) -> usize {
    let mut x = 0;
    for (offset, ch) in text.chars().enumerate() {
        let w = ch.width().unwrap_or(0);
        if x + w > column {
            return offset;
        }
        x += w;
    }
    text.chars().count()
}

/// 上一帧绘制的下拉框（鼠标命中测试用）
#[derive(Debug, Clone, Copy)]
struct DropdownLayout {
    area: Rect,
    /// 第一行显示的候选下标
    first_option: usize,
    /// 显示的候选行数（禁用状态为 0）
    option_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropdownHit {
    Row(usize),
    Chrome,
}

impl DropdownLayout {
    fn hit(&self, column: u16, row: u16) -> Option<DropdownHit> {
        let area = self.area;
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return None;
        }
        let inner_row = usize::from(row - area.y);
        let inside_border = column > area.x && column + 1 < area.right();
        if inside_border && (1..=self.option_rows).contains(&inner_row) {
            return Some(DropdownHit::Row(self.first_option + inner_row - 1));
        }
        Some(DropdownHit::Chrome)
    }
}

/// 应用状态
struct App {
    /// 文档（与提及配置中的访问器共享）
    doc: Rc<RefCell<BlockDocument>>,
    /// 提及装饰器
    mentions: Mentions,
    /// 按键分发、下拉框标志、模态框协调
    services: PopupServices,
    /// 编辑区内侧区域（供布局测量）
    editor_area: Rc<Cell<Rect>>,
    /// 上一帧的下拉框
    dropdown: Option<DropdownLayout>,
    /// 鼠标悬停的候选
    hovered: Option<usize>,
    /// 第一行显示的块
    scroll_top: usize,
    /// 是否需要退出
    should_quit: bool,
    /// 状态消息
    status_message: String,
}

impl App {
    fn new(
        candidates: Vec<MentionCandidate>,
        options: SuggestionOptions,
    ) -> Result<Self, MentionError> {
        let doc = Rc::new(RefCell::new(BlockDocument::empty()));
        let services = PopupServices::new();
        let editor_area = Rc::new(Cell::new(Rect::default()));

        let config = SuggestionConfig::new(
            options,
            move || candidates.clone(),
            {
                let doc = Rc::clone(&doc);
                move || Some(doc.borrow().clone())
            },
            {
                let doc = Rc::clone(&doc);
                move |state| *doc.borrow_mut() = state
            },
            insert_mention,
        )?
        .with_wrapper_rect({
            let editor_area = Rc::clone(&editor_area);
            move || {
                let area = editor_area.get();
                (area.width > 0 && area.height > 0).then(|| to_px(area))
            }
        })
        .with_services(services.clone());

        tracing::info!(
            target: "tui_mention",
            separator = config.separator(),
            candidates = config.suggestions().len(),
            "demo started"
        );

        Ok(Self {
            doc,
            mentions: MentionSuggestion::new(config),
            services,
            editor_area,
            dropdown: None,
            hovered: None,
            scroll_top: 0,
            should_quit: false,
            status_message: String::new(),
        })
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('x'))
        {
            self.should_quit = true;
            return;
        }

        self.status_message.clear();

        // 先交给已挂载的下拉框
        let popup_key = popup_key(key.code);
        let was_open = self.services.suggestions.is_open();
        let popup = self.mentions.popup();
        let pending = popup.and_then(|popup| popup.active_candidate());

        let mut event = PopupKeyEvent::new(popup_key);
        self.services.keys.dispatch(&mut event);

        // 下拉框打开时 Enter/方向键/Esc 不再交给编辑器
        let consumed = event.is_default_prevented() || (was_open && popup_key != Key::Other);

        if consumed {
            match (popup_key, pending) {
                (Key::Enter, Some(candidate)) => {
                    self.status_message = format!("已插入: {}", candidate.text);
                }
                (Key::Escape, _) => self.status_message = "已关闭提及".to_string(),
                _ => {}
            }
        } else {
            self.handle_editor_key(key);
        }

        self.refresh_mentions();
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let mut doc = self.doc.borrow_mut();
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut buf = [0u8; 4];
                doc.insert_text(c.encode_utf8(&mut buf));
            }
            KeyCode::Enter => doc.split_block(),
            KeyCode::Tab => doc.insert_text("    "),
            KeyCode::Backspace => doc.backspace(),
            KeyCode::Left => doc.move_left(),
            KeyCode::Right => doc.move_right(),
            KeyCode::Up => doc.move_up(),
            KeyCode::Down => doc.move_down(),
            KeyCode::Home => doc.move_home(),
            KeyCode::End => doc.move_end(),
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: String) {
        let text = text.replace("\r\n", "\n");
        self.doc.borrow_mut().insert_text(&text);
        self.refresh_mentions();
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let hit = self
            .dropdown
            .and_then(|dropdown| dropdown.hit(mouse.column, mouse.row));

        match mouse.kind {
            MouseEventKind::Moved => {
                let Some(popup) = self.mentions.popup() else {
                    return;
                };
                match hit {
                    Some(DropdownHit::Row(index)) => {
                        if self.hovered != Some(index) {
                            popup.on_option_mouse_enter(index);
                            self.hovered = Some(index);
                        }
                    }
                    _ => {
                        if self.hovered.take().is_some() {
                            popup.on_option_mouse_leave();
                        }
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                match hit {
                    Some(hit) => {
                        if let Some(popup) = self.mentions.popup() {
                            // 点击先到达下拉框，再冒泡到编辑器
                            popup.on_dropdown_click();
                            self.services.modal.on_editor_click();
                            if let DropdownHit::Row(index) = hit {
                                let text = popup.filtered().get(index).map(|c| c.text.clone());
                                popup.on_option_click(index);
                                if let Some(text) = text {
                                    self.status_message = format!("已插入: {text}");
                                }
                            }
                        }
                    }
                    None => {
                        self.services.modal.on_editor_click();
                        self.place_caret(mouse.column, mouse.row);
                    }
                }
                self.refresh_mentions();
            }
            _ => {}
        }
    }

    fn place_caret(&mut self, column: u16, row: u16) {
        let area = self.editor_area.get();
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return;
        }
        let index = self.scroll_top + usize::from(row - area.y);
        let mut doc = self.doc.borrow_mut();
        let last = doc.blocks().len().saturating_sub(1);
        // 点击在最后一块下方：移到文档末尾
        let (index, offset) = match doc.blocks().get(index) {
            Some(block) => {
                let column = usize::from(column - area.x);
                (index, offset_for_column(block.text(), column))
            }
            None => (last, doc.blocks().get(last).map_or(0, |b| b.char_len())),
        };
        doc.set_caret(index, offset);
    }

    fn refresh_mentions(&mut self) {
        match self.mentions.refresh() {
            DecoratorEvent::Mounted { block_key, region } => {
                tracing::info!(
                    target: "tui_mention",
                    block = %block_key,
                    start = region.start,
                    end = region.end,
                    "mention popup mounted"
                );
                self.hovered = None;
            }
            DecoratorEvent::Unmounted => {
                tracing::info!(target: "tui_mention", "mention popup unmounted");
                self.hovered = None;
                self.dropdown = None;
            }
            DecoratorEvent::Updated { .. } | DecoratorEvent::Unchanged => {}
        }
    }

    fn adjust_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }
        let (line, _) = self.doc.borrow().caret();
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if line >= self.scroll_top + viewport_height {
            self.scroll_top = line + 1 - viewport_height;
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // 编辑器区域
                Constraint::Length(1), // 状态行
                Constraint::Length(1), // 快捷键提示
            ])
            .split(frame.area());

        let editor_block = Block::default()
            .borders(Borders::ALL)
            .title(" tui-mention ");
        let inner = editor_block.inner(chunks[0]);
        self.editor_area.set(inner);
        self.adjust_scroll(usize::from(inner.height));

        let lines = self.editor_lines(usize::from(inner.height));
        frame.render_widget(Paragraph::new(lines).block(editor_block), chunks[0]);

        let (line, offset) = self.doc.borrow().caret();
        if line >= self.scroll_top && line < self.scroll_top + usize::from(inner.height) {
            let text = self
                .doc
                .borrow()
                .blocks()
                .get(line)
                .map(|b| b.text().to_string())
                .unwrap_or_default();
            let column = prefix_width(&text, offset);
            let x = inner.x.saturating_add(to_cells(column));
            let y = inner.y.saturating_add(to_cells(line - self.scroll_top));
            if x < inner.right() {
                frame.set_cursor_position((x, y));
            }
        }

        self.render_dropdown(frame, inner);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    /// 可见块的文本，触发区间加下划线
    fn editor_lines(&self, viewport_height: usize) -> Vec<Line<'static>> {
        let doc = self.doc.borrow();
        let mounted = self.mentions.mounted_region();
        let trigger_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);

        doc.blocks()
            .iter()
            .skip(self.scroll_top)
            .take(viewport_height)
            .map(|block| match mounted {
                Some((key, region)) if key == block.key() => {
                    let (before, span, after) =
                        split_at_chars(block.text(), region.start, region.end);
                    Line::from(vec![
                        Span::raw(before.to_string()),
                        Span::styled(span.to_string(), trigger_style),
                        Span::raw(after.to_string()),
                    ])
                }
                _ => Line::from(block.text().to_string()),
            })
            .collect()
    }

    fn render_dropdown(&mut self, frame: &mut Frame, inner: Rect) {
        self.dropdown = None;
        let Some((block_key, region)) = self.mentions.mounted_region() else {
            return;
        };
        let Some(popup) = self.mentions.popup() else {
            return;
        };
        if !popup.is_visible() {
            return;
        }

        let doc = self.doc.borrow();
        let Some(line) = doc.block_index(block_key) else {
            return;
        };
        if line < self.scroll_top || line >= self.scroll_top + usize::from(inner.height) {
            return;
        }
        let text = doc.blocks()[line].text();

        let trigger_column = prefix_width(text, region.start);
        let trigger = Rect {
            x: inner.x.saturating_add(to_cells(trigger_column)),
            y: inner.y.saturating_add(to_cells(line - self.scroll_top)),
            width: to_cells(region.text(text).width()).max(1),
            height: 1,
        };

        let filtered = popup.filtered();
        let widest = filtered
            .iter()
            .map(|candidate| candidate.text.width())
            .max()
            .unwrap_or(0);
        let option_rows = filtered.len().min(DROPDOWN_MAX_ROWS);
        let width = to_cells(widest)
            .saturating_add(4)
            .max(DROPDOWN_MIN_WIDTH)
            .min(inner.width);
        let height = to_cells(option_rows.max(1))
            .saturating_add(2)
            .min(inner.height);

        // 首次绘制：在触发位置下方、左侧缩进处测量一次
        let inset = cells_x(DROPDOWN_INSET);
        let measured = Rect {
            x: (i32::from(trigger.x) + inset).clamp(0, i32::from(u16::MAX)) as u16,
            y: trigger.y.saturating_add(1),
            width,
            height,
        };
        if popup.apply_layout(to_px(trigger), to_px(measured)) {
            tracing::debug!(
                target: "tui_mention",
                position = ?popup.state().position,
                "dropdown positioned"
            );
        }

        let view = popup.view();
        let Some(dropdown) = view.dropdown else {
            return;
        };
        let area = place_dropdown(dropdown.position, trigger, width, height, inner);

        let active = dropdown.active_option().map(|option| option.index);
        let first_option = match active {
            Some(index) if index >= option_rows => index + 1 - option_rows,
            _ => 0,
        };

        let rows: Vec<Line> = if dropdown.disabled {
            let hint = Style::default().fg(Color::DarkGray);
            vec![Line::styled(" 无匹配", hint)]
        } else {
            dropdown
                .options
                .iter()
                .skip(first_option)
                .take(option_rows)
                .map(|option| {
                    let style = if option.active {
                        Style::default().bg(Color::Blue).fg(Color::White)
                    } else {
                        Style::default()
                    };
                    Line::styled(format!(" {} ", option.text), style)
                })
                .collect()
        };

        let border_style = if dropdown.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let widget = Paragraph::new(rows).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);

        self.dropdown = Some(DropdownLayout {
            area,
            first_option,
            option_rows: if dropdown.disabled { 0 } else { option_rows },
        });
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let (line, offset) = self.doc.borrow().caret();
        let mention = match self.mentions.popup() {
            Some(popup) if popup.is_visible() => format!(
                "提及: {}{} ({} 项)",
                self.mentions.config().separator(),
                popup.query(),
                popup.filtered().len()
            ),
            Some(_) => "提及: 已关闭".to_string(),
            None => "提及: 无".to_string(),
        };

        let status_text = if self.status_message.is_empty() {
            format!("行:{} 列:{} | {}", line + 1, offset + 1, mention)
        } else {
            format!("{} | {}", self.status_message, mention)
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.services.suggestions.is_open() {
            "↑/↓:选择  Enter:插入  Esc:关闭  鼠标:悬停/点击  Ctrl-Q:退出"
        } else {
            "@:提及  方向键:移动  Enter:换行  Backspace:删除  Ctrl-Q:退出"
        };

        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_widget(shortcuts_line, area);
    }
}

/// 把 CSS 式的锚定换算成屏幕区域，并限制在编辑区内。
///
/// `bottom` 锚定时下拉框在触发行上方展开。
fn place_dropdown(
    position: DropdownPosition,
    trigger: Rect,
    width: u16,
    height: u16,
    inner: Rect,
) -> Rect {
    let x = match (position.left, position.right) {
        (Some(left), _) => i32::from(trigger.x) + cells_x(left),
        (None, Some(right)) => i32::from(trigger.right()) - cells_x(right) - i32::from(width),
        (None, None) => i32::from(trigger.x),
    };
    let y = match position.bottom {
        Some(bottom) => i32::from(trigger.y) - cells_y(bottom) - i32::from(height),
        None => i32::from(trigger.bottom()),
    };

    let max_x = i32::from(inner.right()) - i32::from(width);
    let max_y = i32::from(inner.bottom()) - i32::from(height);
    Rect {
        x: x.min(max_x).max(i32::from(inner.x)) as u16,
        y: y.min(max_y).max(i32::from(inner.y)) as u16,
        width,
        height,
    }
}

fn load_inputs(
    args: &[String],
) -> Result<(Vec<MentionCandidate>, SuggestionOptions), MentionError> {
    let candidates = match args.get(1) {
        Some(path) => MentionCandidate::list_from_path(path)?,
        None => default_candidates(),
    };
    let options = match args.get(2) {
        Some(path) => SuggestionOptions::from_path(path)?,
        None => SuggestionOptions::default(),
    };
    Ok((candidates, options))
}

fn main() -> io::Result<()> {
    // 获取命令行参数
    let args: Vec<String> = env::args().collect();
    let is_help = |arg: &String| arg == "-h" || arg == "--help";
    if args.iter().skip(1).any(is_help) {
        eprintln!("用法: {} [candidates.json] [options.json]", args[0]);
        eprintln!("\n示例:");
        eprintln!("  {} people.json", args[0]);
        eprintln!("  {} people.json options.json", args[0]);
        process::exit(0);
    }

    if let Err(err) = init_tracing() {
        eprintln!("日志初始化失败: {}", err);
    }

    let (candidates, options) = match load_inputs(&args) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("错误: {}", err);
            process::exit(1);
        }
    };

    let mut app = match App::new(candidates, options) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("错误: {}", err);
            process::exit(1);
        }
    };

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        // 处理事件
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                Event::Paste(text) => app.handle_paste(text),
                Event::Resize(_, _) => {
                    // 重新渲染
                }
                _ => {}
            }
        }
    }

    tracing::info!(target: "tui_mention", "demo finished");
    Ok(())
}
