//! Flows layout blocks onto fixed-size pages
//!
//! The cursor moves top-down. Text is wrapped to its box and never truncated.
//! A block that does not fit the remaining space moves to a new page when it
//! fits on one; taller blocks are split line by line across pages. Tables
//! repeat their header row on every page they span. Page numbers are stamped
//! once the total page count is known.

use super::layout::{Accent, Block, GridCell, PriceCard, TextRole};
use super::metrics::{text_width, wrap_text, Font};
use super::pdf::{Color, Op, Page};
use super::ReportOptions;

// Theme
const PRIMARY: u32 = 0x0052cc;
const PRIMARY_DARK: u32 = 0x003a9e;
const PRIMARY_LIGHT: u32 = 0xf0f4ff;
const SUCCESS: u32 = 0x10b981;
const WARNING: u32 = 0xf59e0b;
const NOTICE_BG: u32 = 0xfef3c7;
const NOTICE_TEXT: u32 = 0x92400e;
const SLATE_900: u32 = 0x1a202c;
const SLATE_700: u32 = 0x4a5568;
const SLATE_500: u32 = 0x6b7280;
const SLATE_300: u32 = 0xd1d5db;
const SLATE_100: u32 = 0xf8f9fa;
const GRID_BORDER: u32 = 0xd4dcff;
const LABEL: u32 = 0x666666;
const SMALL: u32 = 0x999999;
const WHITE: u32 = 0xffffff;

/// Reserved above the bottom margin for the page number
const PAGE_NUMBER_BAND: f32 = 14.0;

const BAR_WIDTH: f32 = 3.0;
const CELL_PADDING_X: f32 = 4.0;
const TABLE_ROW_PADDING: f32 = 3.0;
const TABLE_HEADER_PADDING: f32 = 5.0;
const GRID_PADDING: f32 = 8.0;
const CARD_PADDING: f32 = 10.0;

fn text_op(x: f32, baseline: f32, font: Font, size: f32, color: u32, text: impl Into<String>) -> Op {
    Op::Text {
        x,
        y: baseline,
        font,
        size,
        color: Color::hex(color),
        text: text.into(),
    }
}

fn accent_color(accent: Accent) -> u32 {
    match accent {
        Accent::Primary => PRIMARY,
        Accent::Success => SUCCESS,
    }
}

/// Piece of text on a line, `dx` from the line start
#[derive(Debug, Clone)]
struct Run {
    dx: f32,
    font: Font,
    size: f32,
    color: u32,
    text: String,
}

/// One line of text occupying `height` points of vertical space
#[derive(Debug, Clone)]
struct Line {
    runs: Vec<Run>,
    height: f32,
}

impl Line {
    fn new(font: Font, size: f32, color: u32, text: impl Into<String>, height: f32) -> Self {
        Self {
            runs: vec![Run { dx: 0.0, font, size, color, text: text.into() }],
            height,
        }
    }

    fn shifted(mut self, dx: f32) -> Self {
        for run in &mut self.runs {
            run.dx += dx;
        }
        self
    }

    fn size(&self) -> f32 {
        self.runs.iter().map(|r| r.size).fold(0.0, f32::max)
    }

    fn width(&self) -> f32 {
        self.runs
            .iter()
            .map(|r| r.dx + text_width(r.font, r.size, &r.text))
            .fold(0.0, f32::max)
    }

    /// Baseline for a line whose box starts at `top`
    fn baseline(&self, top: f32) -> f32 {
        top - (self.height + self.size() * 0.7) / 2.0
    }
}

/// Wrap `text` into lines no wider than `max_width`
fn wrapped(text: &str, font: Font, size: f32, color: u32, height: f32, max_width: f32) -> Vec<Line> {
    wrap_text(text, font, size, max_width)
        .into_iter()
        .map(|line| Line::new(font, size, color, line, height))
        .collect()
}

fn stack_height(lines: &[Line]) -> f32 {
    lines.iter().map(|l| l.height).sum()
}

/// Count of leading lines whose combined height fits `space`
fn fitting(lines: &[Line], space: f32) -> usize {
    let mut used = 0.0;
    lines
        .iter()
        .take_while(|line| {
            used += line.height;
            used <= space + 1e-3
        })
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Decoration of a full-width text box
#[derive(Debug, Clone, Copy)]
struct Frame {
    fill: Option<u32>,
    stroke: Option<(u32, f32)>,
    /// Colored bar along the left edge
    bar: Option<u32>,
    /// Horizontal rule along the top edge of the first piece
    rule: Option<u32>,
    check: bool,
    padding: f32,
    indent: f32,
    align: Align,
    /// Start on a new page rather than split when the box fits on one
    keep_together: bool,
    gap_after: f32,
}

impl Frame {
    fn plain(padding: f32) -> Self {
        Self {
            fill: None,
            stroke: None,
            bar: None,
            rule: None,
            check: false,
            padding,
            indent: 0.0,
            align: Align::Left,
            keep_together: true,
            gap_after: 0.0,
        }
    }
}

/// Decoration of a row of table or grid cells
#[derive(Debug, Clone, Copy)]
struct CellStyle {
    fill: u32,
    border: (u32, f32),
    padding: f32,
}

struct Composer<'a> {
    options: &'a ReportOptions,
    pages: Vec<Page>,
    page: Page,
    y: f32,
}

impl<'a> Composer<'a> {
    fn new(options: &'a ReportOptions) -> Self {
        Self {
            options,
            pages: Vec::new(),
            page: Page::default(),
            y: options.page_height - options.margin,
        }
    }

    fn left(&self) -> f32 {
        self.options.margin
    }

    fn width(&self) -> f32 {
        self.options.page_width - 2.0 * self.options.margin
    }

    fn top(&self) -> f32 {
        self.options.page_height - self.options.margin
    }

    fn bottom(&self) -> f32 {
        self.options.margin + PAGE_NUMBER_BAND
    }

    /// Usable height of an empty page
    fn page_space(&self) -> f32 {
        self.top() - self.bottom()
    }

    fn space(&self) -> f32 {
        self.y - self.bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.page));
        self.y = self.top();
    }

    fn at_page_start(&self) -> bool {
        self.y >= self.top() - 1e-3
    }

    /// Break the page unless `height` fits. A page start never breaks again.
    fn ensure_space(&mut self, height: f32) {
        if height > self.space() + 1e-3 && !self.at_page_start() {
            self.new_page();
        }
    }

    /// Move down by `gap`, stopping at the bottom edge
    fn advance(&mut self, gap: f32) {
        self.y = (self.y - gap).max(self.bottom());
    }

    fn push(&mut self, op: Op) {
        self.page.push(op);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Option<u32>, stroke: Option<(u32, f32)>) {
        self.push(Op::Rect {
            x,
            y,
            width,
            height,
            fill: fill.map(Color::hex),
            stroke: stroke.map(|(c, w)| (Color::hex(c), w)),
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: u32, line_width: f32) {
        self.push(Op::Polyline {
            points: vec![from, to],
            color: Color::hex(color),
            line_width,
        });
    }

    /// Draw `line` inside a box starting at `top`, aligned within `x..x + width`
    fn text_line(&mut self, line: &Line, x: f32, width: f32, top: f32, align: Align) {
        let x = match align {
            Align::Left => x,
            Align::Center => x + (width - line.width()) / 2.0,
        };
        let baseline = line.baseline(top);
        for run in &line.runs {
            self.push(text_op(x + run.dx, baseline, run.font, run.size, run.color, run.text.as_str()));
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Title { text, subtitle } => self.title(text, subtitle),
            Block::PlanHeader { title, subtitle } => self.plan_header(title, subtitle),
            Block::PriceCards(cards) => self.price_cards(cards),
            Block::Notice { lead, text } => self.notice(lead, text),
            Block::SectionTitle(text) => self.section_title(text),
            Block::Table { header, rows, weights } => self.table(header, rows, weights),
            Block::Grid { columns, cells } => self.grid(*columns, cells),
            Block::CheckItem { title, detail } => self.check_item(title, detail.as_deref()),
            Block::Paragraph { text, role } => self.paragraph(text, *role),
            Block::Link { url } => self.link(url),
            Block::Spacer(height) => self.advance(*height),
            Block::PageBreak => {
                if !self.page.is_empty() {
                    self.new_page();
                }
            }
            Block::Footer { lines } => self.footer(lines),
        }
    }

    /// Full-width box of lines. Moves to a new page when the whole box fits
    /// on one, otherwise splits between lines and repeats the frame.
    fn boxed(&mut self, lines: &[Line], frame: &Frame) {
        let padding = 2.0 * frame.padding;
        let total = stack_height(lines) + padding;
        if frame.keep_together && total <= self.page_space() {
            self.ensure_space(total);
        }

        let mut rest = lines;
        let mut first = true;
        loop {
            let mut count = fitting(rest, self.space() - padding);
            if count == 0 && !rest.is_empty() {
                if !self.at_page_start() {
                    self.new_page();
                    continue;
                }
                count = 1;
            }
            let (piece, tail) = rest.split_at(count);
            self.frame_piece(piece, frame, first);
            rest = tail;
            first = false;
            if rest.is_empty() {
                break;
            }
            self.new_page();
        }
        self.advance(frame.gap_after);
    }

    fn frame_piece(&mut self, lines: &[Line], frame: &Frame, first: bool) {
        let height = stack_height(lines) + 2.0 * frame.padding;
        let (left, width, top) = (self.left(), self.width(), self.y);

        if frame.fill.is_some() || frame.stroke.is_some() {
            self.rect(left, top - height, width, height, frame.fill, frame.stroke);
        }
        if let Some(bar) = frame.bar {
            self.rect(left, top - height, BAR_WIDTH, height, Some(bar), None);
        }
        if let (Some(rule), true) = (frame.rule, first) {
            self.line((left, top), (left + width, top), rule, 0.5);
        }
        if frame.check && first {
            let (cx, cy) = (left + 14.0, top - height.min(40.0) / 2.0);
            self.push(Op::Polyline {
                points: vec![(cx - 4.5, cy + 0.5), (cx - 1.0, cy - 3.5), (cx + 5.0, cy + 4.5)],
                color: Color::hex(SUCCESS),
                line_width: 1.8,
            });
        }

        let text_x = left + frame.indent;
        let text_width = width - 2.0 * frame.indent;
        let mut line_top = top - frame.padding;
        for line in lines {
            self.text_line(line, text_x, text_width, line_top, frame.align);
            line_top -= line.height;
        }
        self.y = top - height;
    }

    fn title(&mut self, text: &str, subtitle: &str) {
        let inner = self.width() - 30.0;
        let mut lines = wrapped(text, Font::Bold, 20.0, WHITE, 24.0, inner);
        lines.extend(wrapped(subtitle, Font::Regular, 10.0, WHITE, 14.0, inner));
        let frame = Frame {
            fill: Some(PRIMARY),
            indent: 15.0,
            gap_after: 15.0,
            ..Frame::plain(12.0)
        };
        self.boxed(&lines, &frame);
    }

    fn plan_header(&mut self, title: &str, subtitle: &str) {
        let inner = self.width() - 30.0;
        let mut lines = wrapped(title, Font::Bold, 14.0, WHITE, 18.0, inner);
        lines.extend(wrapped(subtitle, Font::Regular, 10.0, WHITE, 14.0, inner));
        let frame = Frame {
            fill: Some(PRIMARY_DARK),
            indent: 15.0,
            gap_after: 15.0,
            ..Frame::plain(7.0)
        };
        // keep the header on the same page as the price cards
        let height = stack_height(&lines) + 2.0 * frame.padding;
        let keep = height + frame.gap_after + 70.0;
        if keep <= self.page_space() {
            self.ensure_space(keep);
        }
        self.boxed(&lines, &frame);
    }

    fn price_cards(&mut self, cards: &[PriceCard]) {
        if cards.is_empty() {
            return;
        }
        let gap = 10.0;
        let count = cards.len() as f32;
        let card_width = (self.width() - gap * (count - 1.0)) / count;
        let inner = card_width - 2.0 * CELL_PADDING_X;

        let stacks: Vec<Vec<Line>> = cards
            .iter()
            .map(|card| {
                let accent = accent_color(card.accent);
                let mut lines = wrapped(&card.label, Font::Bold, 8.0, LABEL, 12.0, inner);
                lines.extend(wrapped(&card.value, Font::Bold, 16.0, accent, 22.0, inner));
                if !card.caption.trim().is_empty() {
                    lines.extend(wrapped(&card.caption, Font::Regular, 8.0, SMALL, 12.0, inner));
                }
                lines
            })
            .collect();
        let height = stacks.iter().map(|s| stack_height(s)).fold(0.0, f32::max) + 2.0 * CARD_PADDING;

        self.ensure_space(height);
        let (left, top) = (self.left(), self.y);
        for (i, (card, lines)) in cards.iter().zip(&stacks).enumerate() {
            let x = left + i as f32 * (card_width + gap);
            self.rect(x, top - height, card_width, height, Some(PRIMARY_LIGHT), Some((SLATE_300, 0.5)));
            self.rect(x, top - 3.0, card_width, 3.0, Some(accent_color(card.accent)), None);

            let mut line_top = top - CARD_PADDING;
            for line in lines {
                self.text_line(line, x + CELL_PADDING_X, inner, line_top, Align::Center);
                line_top -= line.height;
            }
        }
        self.y = top - height;
        self.advance(20.0);
    }

    fn notice(&mut self, lead: &str, text: &str) {
        let (size, height, padding) = (10.0, 14.0, 10.0);
        let indent = BAR_WIDTH + padding;
        let inner = self.width() - 2.0 * indent;
        let lead_width = (text_width(Font::Bold, size, lead) + 4.0).min(inner / 2.0);

        let mut lines: Vec<Line> = wrapped(text, Font::Regular, size, NOTICE_TEXT, height, inner - lead_width)
            .into_iter()
            .map(|line| line.shifted(lead_width))
            .collect();
        let lead_lines = wrapped(lead, Font::Bold, size, NOTICE_TEXT, height, lead_width);
        // the lead shares the first text lines
        for (i, lead_line) in lead_lines.into_iter().enumerate() {
            match lines.get_mut(i) {
                Some(line) => {
                    let mut runs = lead_line.runs;
                    runs.append(&mut line.runs);
                    line.runs = runs;
                }
                None => lines.push(lead_line),
            }
        }

        let frame = Frame {
            fill: Some(NOTICE_BG),
            bar: Some(WARNING),
            indent,
            gap_after: 20.0,
            ..Frame::plain(padding)
        };
        self.boxed(&lines, &frame);
    }

    fn section_title(&mut self, text: &str) {
        let lines = wrapped(text, Font::Bold, 13.0, PRIMARY_DARK, 18.0, self.width());
        let height = stack_height(&lines) + 10.0;
        // keep with the first rows of what follows
        let keep = height + 60.0;
        if keep <= self.page_space() {
            self.ensure_space(keep);
        }
        self.boxed(&lines, &Frame::plain(0.0));

        let (left, width) = (self.left(), self.width());
        let rule_y = self.y - 4.0;
        self.line((left, rule_y), (left + width, rule_y), GRID_BORDER, 1.0);
        self.advance(10.0);
    }

    /// Lines of each cell, wrapped to its column
    fn cell_lines(texts: &[&str], widths: &[f32], font: Font, size: f32, color: u32) -> Vec<Vec<Line>> {
        texts
            .iter()
            .zip(widths)
            .map(|(text, width)| wrapped(text, font, size, color, size + 3.0, width - 2.0 * CELL_PADDING_X))
            .collect()
    }

    /// One row of cells. Cells grow with their text; a row taller than the
    /// remaining space moves to the next page when it fits there, otherwise it
    /// is split between lines. `continue_on` runs after every page break.
    fn cell_row(
        &mut self,
        cells: &[Vec<Line>],
        widths: &[f32],
        style: CellStyle,
        reserve: f32,
        continue_on: &dyn Fn(&mut Self),
    ) {
        let padding = 2.0 * style.padding;
        let mut rest: Vec<&[Line]> = cells.iter().map(|c| c.as_slice()).collect();
        let mut moved = false;

        loop {
            let remaining = rest.iter().map(|l| stack_height(l)).fold(0.0, f32::max) + padding;
            let mut counts: Vec<usize> = rest.iter().map(|l| fitting(l, self.space() - padding)).collect();
            let fits = rest.iter().zip(&counts).all(|(l, n)| *n == l.len()) && remaining <= self.space() + 1e-3;

            if !fits && !moved {
                let stuck = counts.iter().all(|n| *n == 0);
                if stuck || remaining <= self.page_space() - reserve {
                    self.new_page();
                    continue_on(self);
                    moved = true;
                    continue;
                }
            }
            if counts.iter().all(|n| *n == 0) {
                // a page too short for a single line still makes progress
                for (n, lines) in counts.iter_mut().zip(&rest) {
                    *n = lines.len().min(1);
                }
            }

            let pieces: Vec<&[Line]> = rest.iter().copied().zip(&counts).map(|(l, n)| &l[..*n]).collect();
            let height = pieces.iter().map(|l| stack_height(l)).fold(0.0, f32::max) + padding;
            let (mut x, top) = (self.left(), self.y);
            for (lines, width) in pieces.iter().zip(widths) {
                self.rect(x, top - height, *width, height, Some(style.fill), Some(style.border));
                let mut line_top = top - style.padding;
                for line in lines.iter() {
                    self.text_line(line, x + CELL_PADDING_X, width - 2.0 * CELL_PADDING_X, line_top, Align::Center);
                    line_top -= line.height;
                }
                x += width;
            }
            self.y = top - height;

            rest = rest.iter().copied().zip(&counts).map(|(l, n)| &l[*n..]).collect();
            if rest.iter().all(|l| l.is_empty()) {
                break;
            }
            self.new_page();
            continue_on(self);
            moved = true;
        }
    }

    fn table_header(&mut self, header: &[String], widths: &[f32]) {
        let labels: Vec<&str> = header.iter().map(String::as_str).collect();
        let cells = Self::cell_lines(&labels, widths, Font::Bold, 9.0, WHITE);
        let height = cells.iter().map(|l| stack_height(l)).fold(0.0, f32::max) + 2.0 * TABLE_HEADER_PADDING;

        let (mut x, top) = (self.left(), self.y);
        for (lines, width) in cells.iter().zip(widths) {
            self.rect(x, top - height, *width, height, Some(PRIMARY), Some((SLATE_300, 0.5)));
            let mut line_top = top - TABLE_HEADER_PADDING;
            for line in lines {
                self.text_line(line, x + CELL_PADDING_X, width - 2.0 * CELL_PADDING_X, line_top, Align::Center);
                line_top -= line.height;
            }
            x += width;
        }
        self.y = top - height;
    }

    fn table(&mut self, header: &[String], rows: &[Vec<String>], weights: &[f32]) {
        let columns = header.len().max(1);
        let total: f32 = weights.iter().take(columns).sum();
        let widths: Vec<f32> = if weights.len() >= columns && total > 0.0 {
            weights.iter().take(columns).map(|w| w / total * self.width()).collect()
        } else {
            vec![self.width() / columns as f32; columns]
        };

        let labels: Vec<&str> = header.iter().map(String::as_str).collect();
        let header_height = Self::cell_lines(&labels, &widths, Font::Bold, 9.0, WHITE)
            .iter()
            .map(|l| stack_height(l))
            .fold(0.0, f32::max)
            + 2.0 * TABLE_HEADER_PADDING;

        self.ensure_space(header_height + 12.0 + 2.0 * TABLE_ROW_PADDING);
        self.table_header(header, &widths);

        let repeat_header = |composer: &mut Self| composer.table_header(header, &widths);
        for (i, row) in rows.iter().enumerate() {
            let fill = if i % 2 == 0 { PRIMARY_LIGHT } else { WHITE };
            let texts: Vec<&str> = (0..columns).map(|c| row.get(c).map_or("", String::as_str)).collect();
            let cells = Self::cell_lines(&texts, &widths, Font::Regular, 9.0, SLATE_900);
            let style = CellStyle { fill, border: (SLATE_300, 0.5), padding: TABLE_ROW_PADDING };
            self.cell_row(&cells, &widths, style, header_height, &repeat_header);
        }
    }

    fn grid(&mut self, columns: usize, cells: &[GridCell]) {
        let columns = columns.max(1);
        let widths = vec![self.width() / columns as f32; columns];
        let style = CellStyle { fill: PRIMARY_LIGHT, border: (GRID_BORDER, 1.0), padding: GRID_PADDING };

        for row in cells.chunks(columns) {
            let stacks: Vec<Vec<Line>> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let inner = width - 2.0 * CELL_PADDING_X;
                    let mut lines = wrapped(&cell.heading, Font::Bold, 12.0, PRIMARY, 18.0, inner);
                    lines.extend(wrapped(&cell.text, Font::Regular, 9.0, SLATE_500, 12.0, inner));
                    lines
                })
                .collect();
            self.cell_row(&stacks, &widths, style, 0.0, &|_: &mut Self| {});
        }
    }

    fn check_item(&mut self, title: &str, detail: Option<&str>) {
        let indent = 28.0;
        let inner = self.width() - indent - 10.0;
        let mut lines = wrapped(title, Font::Bold, 10.0, SLATE_900, 13.0, inner);
        if let Some(detail) = detail {
            lines.extend(wrapped(detail, Font::Regular, 9.0, SLATE_500, 12.0, inner));
        }
        let frame = Frame {
            fill: Some(SLATE_100),
            stroke: Some((SLATE_300, 0.5)),
            bar: Some(PRIMARY),
            check: true,
            indent,
            gap_after: 8.0,
            ..Frame::plain(8.0)
        };
        self.boxed(&lines, &frame);
    }

    fn paragraph(&mut self, text: &str, role: TextRole) {
        let color = match role {
            TextRole::Body => SLATE_700,
            TextRole::Muted => SLATE_500,
        };
        let lines = wrapped(text, Font::Regular, 10.0, color, 14.0, self.width());
        let frame = Frame {
            keep_together: false,
            gap_after: 5.0,
            ..Frame::plain(0.0)
        };
        self.boxed(&lines, &frame);
    }

    fn link(&mut self, url: &str) {
        let lines = wrapped(url, Font::Bold, 11.0, PRIMARY, 15.0, self.width());
        for line in &lines {
            self.ensure_space(line.height);
            let (left, top) = (self.left(), self.y);
            self.text_line(line, left, self.width(), top, Align::Left);
            self.push(Op::Link {
                x: left,
                y: top - line.height,
                width: line.width(),
                height: line.height,
                uri: url.to_string(),
            });
            self.y = top - line.height;
        }
    }

    fn footer(&mut self, lines: &[String]) {
        let width = self.width();
        let footer_lines: Vec<Line> = lines
            .iter()
            .enumerate()
            .flat_map(|(i, text)| {
                let (size, color) = if i == 0 { (9.0, SLATE_700) } else { (8.0, SMALL) };
                wrapped(text, Font::Regular, size, color, 13.0, width)
            })
            .collect();
        let frame = Frame {
            rule: Some(SLATE_300),
            align: Align::Center,
            ..Frame::plain(6.0)
        };
        self.boxed(&footer_lines, &frame);
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(std::mem::take(&mut self.page));
        let total = self.pages.len();
        let center = self.options.page_width / 2.0;
        let baseline = self.options.margin + 3.0;

        for (i, page) in self.pages.iter_mut().enumerate() {
            let label = format!("Página {} de {}", i + 1, total);
            let x = center - text_width(Font::Regular, 8.0, &label) / 2.0;
            page.push(text_op(x, baseline, Font::Regular, 8.0, SMALL, label));
        }
        self.pages
    }
}

/// Lay out `blocks` on pages sized by `options`
pub fn compose(blocks: &[Block], options: &ReportOptions) -> Vec<Page> {
    let mut composer = Composer::new(options);
    for block in blocks {
        composer.block(block);
    }
    composer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn texts(page: &Page) -> Vec<&str> {
        page.texts().collect()
    }

    fn all_words(pages: &[Page]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.texts())
            .flat_map(str::split_whitespace)
            .map(String::from)
            .collect()
    }

    fn table(rows: usize) -> Block {
        Block::Table {
            header: vec!["Idade".into(), "Faixa Etária".into(), "Valor".into()],
            rows: (0..rows)
                .map(|i| vec![i.to_string(), "19-30".into(), "R$ 180,00".into()])
                .collect(),
            weights: vec![1.5, 2.0, 2.0],
        }
    }

    /// Offending op, if any op leaves the printable area
    fn outside_page<'p>(pages: &'p [Page], options: &ReportOptions) -> Option<&'p Op> {
        let eps = 1e-2;
        let (left, right) = (options.margin - eps, options.page_width - options.margin + eps);
        let (bottom, top) = (options.margin - eps, options.page_height - options.margin + eps);
        let inside = |x: f32, y: f32| x >= left && x <= right && y >= bottom && y <= top;

        pages.iter().flat_map(|p| &p.ops).find(|op| match op {
            Op::Text { x, y, font, size, text, .. } => {
                !(inside(*x, *y) && inside(x + text_width(*font, *size, text), *y))
            }
            Op::Rect { x, y, width, height, .. } | Op::Link { x, y, width, height, .. } => {
                !(inside(*x, *y) && inside(x + width, y + height))
            }
            Op::Polyline { points, .. } => !points.iter().all(|(x, y)| inside(*x, *y)),
        })
    }

    #[test]
    fn test_empty_document_has_one_numbered_page() {
        let pages = compose(&[], &ReportOptions::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0]), vec!["Página 1 de 1"]);
    }

    #[test]
    fn test_page_break_skips_empty_page() {
        let blocks = vec![
            Block::PageBreak,
            Block::Paragraph { text: "um".into(), role: TextRole::Body },
            Block::PageBreak,
            Block::Paragraph { text: "dois".into(), role: TextRole::Body },
        ];
        let pages = compose(&blocks, &ReportOptions::default());
        assert_eq!(pages.len(), 2);
        assert!(texts(&pages[0]).contains(&"um"));
        assert!(texts(&pages[1]).contains(&"dois"));
        assert!(texts(&pages[1]).contains(&"Página 2 de 2"));
    }

    #[test]
    fn test_long_table_repeats_header() {
        let pages = compose(&[table(120)], &ReportOptions::default());
        assert!(pages.len() >= 3);

        for page in &pages {
            assert!(texts(page).contains(&"Idade"));
        }
        let rows: usize = pages
            .iter()
            .map(|p| texts(p).iter().filter(|t| **t == "R$ 180,00").count())
            .sum();
        assert_eq!(rows, 120);
    }

    #[test]
    fn test_content_stays_inside_margins() {
        let options = ReportOptions::default();
        let blocks = vec![
            Block::Title { text: "Cotação de Plano de Saúde".into(), subtitle: "Data: 19 de outubro de 2026".into() },
            table(80),
            Block::Grid {
                columns: 2,
                cells: (0..9)
                    .map(|i| GridCell { heading: format!("{} dias", i * 30), text: "Consultas".into() })
                    .collect(),
            },
        ];
        let pages = compose(&blocks, &options);
        assert_eq!(outside_page(&pages, &options), None);
    }

    #[test]
    fn test_municipality_list_splits_across_pages() {
        let options = ReportOptions::default();
        let names: Vec<String> = (0..800).map(|i| format!("Município {}", i)).collect();
        let blocks = vec![
            Block::SectionTitle("Municípios Atendidos".into()),
            Block::CheckItem { title: names.join(", "), detail: None },
        ];
        let pages = compose(&blocks, &options);

        assert!(pages.len() > 1);
        for op in pages.iter().flat_map(|p| &p.ops) {
            if let Op::Text { y, .. } = op {
                assert!(*y >= options.margin, "text drawn below the margin at {}", y);
            }
        }
        assert_eq!(outside_page(&pages, &options), None);

        let joined = pages.iter().flat_map(|p| p.texts()).collect::<Vec<_>>().join(" ");
        assert!(joined.contains("Município 0,"));
        assert!(joined.contains("Município 799"));
        let listed = all_words(&pages).iter().filter(|w| *w == "Município").count();
        assert_eq!(listed, 800);

        // the check mark belongs to the first piece only
        let checks = pages
            .iter()
            .flat_map(|p| &p.ops)
            .filter(|op| matches!(op, Op::Polyline { points, .. } if points.len() == 3))
            .count();
        assert_eq!(checks, 1);
    }

    #[test]
    fn test_long_notice_splits_across_pages() {
        let options = ReportOptions::default();
        let text = vec!["Consulte os prazos de carência antes de contratar."; 150].join(" ");
        let pages = compose(&[Block::Notice { lead: "Atenção:".into(), text }], &options);

        assert!(pages.len() > 1);
        assert_eq!(outside_page(&pages, &options), None);
        assert_eq!(all_words(&pages).iter().filter(|w| *w == "carência").count(), 150);
        assert_eq!(all_words(&pages).iter().filter(|w| *w == "Atenção:").count(), 1);
    }

    #[test]
    fn test_grid_cell_text_wraps_instead_of_truncating() {
        let options = ReportOptions::default();
        let description = "Parto a termo, exceto casos de urgência e emergência previstos em contrato";
        let blocks = vec![Block::Grid {
            columns: 2,
            cells: vec![
                GridCell { heading: "300 dias".into(), text: description.into() },
                GridCell { heading: "30 dias".into(), text: "Consultas".into() },
            ],
        }];
        let pages = compose(&blocks, &options);

        let lines: Vec<&str> = texts(&pages[0]);
        assert!(lines.iter().all(|t| !t.contains("...")));
        let wrapped = lines
            .iter()
            .skip_while(|t| **t != "300 dias")
            .skip(1)
            .take_while(|t| **t != "30 dias")
            .copied()
            .collect::<Vec<_>>();
        assert!(wrapped.len() > 1);
        assert_eq!(wrapped.join(" "), description);

        // both cells of the row grow to the wrapped height
        let heights: Vec<f32> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect { height, .. } => Some(*height),
                _ => None,
            })
            .collect();
        assert_eq!(heights.len(), 2);
        assert_eq!(heights[0], heights[1]);
        assert!(heights[0] > 2.0 * GRID_PADDING + 18.0 + 12.0);
        assert_eq!(outside_page(&pages, &options), None);
    }

    #[test]
    fn test_table_cell_wraps_and_row_grows() {
        let description = "Parto a termo, exceto casos de urgência e emergência previstos em contrato";
        let block = Block::Table {
            header: vec!["Idade".into(), "Faixa Etária".into(), "Valor".into()],
            rows: vec![
                vec!["25".into(), description.into(), "R$ 180,00".into()],
                vec!["65".into(), "59+".into(), "R$ 400,00".into()],
            ],
            weights: vec![1.5, 2.0, 2.0],
        };
        let pages = compose(&[block], &ReportOptions::default());

        let words = all_words(&pages);
        for word in description.split_whitespace() {
            assert!(words.iter().any(|w| w == word), "{} missing", word);
        }
        assert!(texts(&pages[0]).iter().all(|t| !t.contains("...")));

        let row_heights: Vec<f32> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect { height, fill: Some(fill), .. } if *fill != Color::hex(PRIMARY) => Some(*height),
                _ => None,
            })
            .collect();
        // three cells per row; the wrapped row is taller than the plain one
        assert_eq!(row_heights.len(), 6);
        assert!(row_heights[0] > row_heights[3]);
        assert_eq!(row_heights[3], 12.0 + 2.0 * TABLE_ROW_PADDING);
    }

    #[test]
    fn test_link_annotation_emitted() {
        let pages = compose(
            &[Block::Link { url: "https://www.unimed.com.br/rede".into() }],
            &ReportOptions::default(),
        );
        let links: Vec<&Op> = pages[0].ops.iter().filter(|op| matches!(op, Op::Link { .. })).collect();
        assert_eq!(links.len(), 1);
        assert!(matches!(links[0], Op::Link { uri, .. } if uri == "https://www.unimed.com.br/rede"));
    }

    #[test]
    fn test_price_cards_split_width() {
        let options = ReportOptions::default();
        let cards: Vec<PriceCard> = ["VALOR TOTAL", "DESCONTO APLICADO", "VALOR FINAL"]
            .iter()
            .map(|label| PriceCard {
                label: label.to_string(),
                value: "R$ 1,00".into(),
                caption: "sem desconto".into(),
                accent: Accent::Primary,
            })
            .collect();
        let pages = compose(&[Block::PriceCards(cards)], &options);

        let backgrounds: Vec<f32> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect { width, stroke: Some(_), .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(backgrounds.len(), 3);
        let expected = (options.page_width - 2.0 * options.margin - 20.0) / 3.0;
        assert!(backgrounds.iter().all(|w| (w - expected).abs() < 1e-3));
    }

    #[test]
    fn test_page_number_inside_band() {
        let options = ReportOptions::default();
        let pages = compose(&[table(200)], &options);
        for (i, page) in pages.iter().enumerate() {
            let label = format!("Página {} de {}", i + 1, pages.len());
            let found = page.ops.iter().find_map(|op| match op {
                Op::Text { text, y, .. } if *text == label => Some(*y),
                _ => None,
            });
            let y = found.unwrap();
            assert!(y >= options.margin && y < options.margin + PAGE_NUMBER_BAND);
        }
    }

    fn words(max: usize) -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Zçãé]{1,10}", 1..max).prop_map(|w| w.join(" "))
    }

    fn short_words(max: usize) -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zçã]{1,6}", 1..max).prop_map(|w| w.join(" "))
    }

    fn any_block() -> impl Strategy<Value = Block> {
        prop_oneof![
            (words(8), words(6)).prop_map(|(text, subtitle)| Block::Title { text, subtitle }),
            (words(8), words(4)).prop_map(|(title, subtitle)| Block::PlanHeader { title, subtitle }),
            prop::collection::vec((short_words(3), short_words(2), short_words(4)), 1..4).prop_map(|cards| {
                Block::PriceCards(
                    cards
                        .into_iter()
                        .map(|(label, value, caption)| PriceCard { label, value, caption, accent: Accent::Success })
                        .collect(),
                )
            }),
            (words(3), words(300)).prop_map(|(lead, text)| Block::Notice { lead, text }),
            words(6).prop_map(Block::SectionTitle),
            prop::collection::vec(prop::collection::vec(words(12), 3), 0..40).prop_map(|rows| Block::Table {
                header: vec!["Idade".into(), "Faixa".into(), "Valor".into()],
                rows,
                weights: vec![1.0, 1.5, 2.0],
            }),
            prop::collection::vec((words(3), words(40)), 0..10).prop_map(|cells| Block::Grid {
                columns: 2,
                cells: cells.into_iter().map(|(heading, text)| GridCell { heading, text }).collect(),
            }),
            (words(600), prop::option::of(words(40)))
                .prop_map(|(title, detail)| Block::CheckItem { title, detail }),
            words(120).prop_map(|text| Block::Paragraph { text, role: TextRole::Muted }),
            "https://[a-z]{1,20}\\.com\\.br/[a-z/-]{0,120}".prop_map(|url| Block::Link { url }),
            (0.0f32..300.0).prop_map(Block::Spacer),
            Just(Block::PageBreak),
            prop::collection::vec(words(30), 1..3).prop_map(|lines| Block::Footer { lines }),
        ]
    }

    /// Words of every text a block carries, links excepted
    fn input_words(block: &Block) -> Vec<String> {
        let strings: Vec<&str> = match block {
            Block::Title { text, subtitle } => vec![text.as_str(), subtitle.as_str()],
            Block::PlanHeader { title, subtitle } => vec![title.as_str(), subtitle.as_str()],
            Block::PriceCards(cards) => cards
                .iter()
                .flat_map(|c| [c.label.as_str(), c.value.as_str(), c.caption.as_str()])
                .collect(),
            Block::Notice { lead, text } => vec![lead.as_str(), text.as_str()],
            Block::SectionTitle(text) => vec![text.as_str()],
            Block::Table { header, rows, .. } => header
                .iter()
                .chain(rows.iter().flatten())
                .map(String::as_str)
                .collect(),
            Block::Grid { cells, .. } => cells
                .iter()
                .flat_map(|c| [c.heading.as_str(), c.text.as_str()])
                .collect(),
            Block::CheckItem { title, detail } => {
                std::iter::once(title.as_str()).chain(detail.as_deref()).collect()
            }
            Block::Paragraph { text, .. } => vec![text.as_str()],
            Block::Footer { lines } => lines.iter().map(String::as_str).collect(),
            Block::Link { .. } | Block::Spacer(_) | Block::PageBreak => vec![],
        };
        strings.iter().flat_map(|s| s.split_whitespace()).map(String::from).collect()
    }

    fn tally(words: impl IntoIterator<Item = String>) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }
        counts
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_ops_stay_on_page(blocks in prop::collection::vec(any_block(), 0..12)) {
            let options = ReportOptions::default();
            let pages = compose(&blocks, &options);
            prop_assert!(!pages.is_empty());
            prop_assert_eq!(outside_page(&pages, &options), None);
        }

        #[test]
        fn prop_every_word_is_printed(blocks in prop::collection::vec(any_block(), 0..12)) {
            let pages = compose(&blocks, &ReportOptions::default());
            let printed = tally(all_words(&pages));
            let expected = tally(blocks.iter().flat_map(input_words));
            for (word, count) in expected {
                let seen = printed.get(&word).copied().unwrap_or(0);
                prop_assert!(seen >= count, "{:?} printed {} of {} times", word, seen, count);
            }
        }

        #[test]
        fn prop_links_keep_their_target(blocks in prop::collection::vec(any_block(), 0..8)) {
            let pages = compose(&blocks, &ReportOptions::default());
            let expected = blocks.iter().filter(|b| matches!(b, Block::Link { .. })).count();
            let linked: Vec<&str> = pages
                .iter()
                .flat_map(|p| &p.ops)
                .filter_map(|op| match op {
                    Op::Link { uri, .. } => Some(uri.as_str()),
                    _ => None,
                })
                .collect();
            prop_assert!(linked.len() >= expected);
            for block in &blocks {
                if let Block::Link { url } = block {
                    prop_assert!(linked.contains(&url.as_str()));
                }
            }
        }
    }
}
