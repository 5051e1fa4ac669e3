//! Synthetic TrueType fonts for tests.
//!
//! Builds small but structurally complete fonts in memory: `head`, `hhea`,
//! `maxp`, `hmtx`, `cmap` (format 4, plus format 12 when needed), `name`,
//! `post`, optional `OS/2`, and long-format `glyf`/`loca`.
//!
//! Public but hidden so the integration tests can share the builders.

#![allow(dead_code)]

/// Outline kind of a test glyph.
#[derive(Debug, Clone)]
pub enum TestGlyph {
    /// No outline (like a space)
    Empty(u16),
    /// A one-point simple glyph
    Simple(u16),
    /// A composite referencing other glyphs
    Composite(u16, Vec<u16>),
}

impl TestGlyph {
    fn advance(&self) -> u16 {
        match self {
            TestGlyph::Empty(a) | TestGlyph::Simple(a) | TestGlyph::Composite(a, _) => *a,
        }
    }

    fn outline(&self) -> Vec<u8> {
        match self {
            TestGlyph::Empty(_) => Vec::new(),
            TestGlyph::Simple(_) => {
                let mut out = Vec::new();
                for v in [1i16, 0, 0, 100, 100] {
                    out.extend_from_slice(&v.to_be_bytes());
                }
                out.extend_from_slice(&0u16.to_be_bytes()); // endPtsOfContours[0]
                out.extend_from_slice(&0u16.to_be_bytes()); // instructionLength
                out.extend_from_slice(&[0x37, 50, 50]); // flags, x, y
                out.push(0);
                out
            },
            TestGlyph::Composite(_, parts) => {
                let mut out = Vec::new();
                for v in [-1i16, 0, 0, 100, 100] {
                    out.extend_from_slice(&v.to_be_bytes());
                }
                for (i, gid) in parts.iter().enumerate() {
                    let more = if i + 1 < parts.len() { 0x0020u16 } else { 0 };
                    // ARGS_ARE_XY_VALUES, byte-sized args
                    out.extend_from_slice(&(0x0002 | more).to_be_bytes());
                    out.extend_from_slice(&gid.to_be_bytes());
                    out.extend_from_slice(&[0, 0]);
                }
                out
            },
        }
    }
}

/// Builder for a synthetic font.
#[derive(Debug, Clone)]
pub struct TestFont {
    pub units_per_em: u16,
    pub postscript_name: Option<String>,
    pub glyphs: Vec<TestGlyph>,
    pub chars: Vec<(char, u16)>,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    pub bbox: [i16; 4],
    pub cap_height: i16,
    pub x_height: i16,
    pub weight_class: u16,
    pub italic_angle: i32,
    pub fixed_pitch: bool,
    pub with_os2: bool,
    pub with_glyf: bool,
}

impl TestFont {
    /// A font with only `.notdef` (glyph 0, advance 500).
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            postscript_name: Some("TestSans".to_string()),
            glyphs: vec![TestGlyph::Simple(500)],
            chars: Vec::new(),
            ascent: 800,
            descent: -200,
            line_gap: 0,
            bbox: [-50, -200, 1000, 900],
            cap_height: 700,
            x_height: 500,
            weight_class: 400,
            italic_angle: 0,
            fixed_pitch: false,
            with_os2: true,
            with_glyf: true,
        }
    }

    pub fn glyph(mut self, glyph: TestGlyph) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn simple(self, advance: u16) -> Self {
        self.glyph(TestGlyph::Simple(advance))
    }

    pub fn map(mut self, ch: char, gid: u16) -> Self {
        self.chars.push((ch, gid));
        self
    }

    pub fn name(mut self, name: Option<&str>) -> Self {
        self.postscript_name = name.map(str::to_string);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"maxp", self.maxp()),
            (*b"hmtx", self.hmtx()),
            (*b"cmap", self.cmap()),
            (*b"name", self.name_table()),
            (*b"post", self.post()),
        ];
        if self.with_os2 {
            tables.push((*b"OS/2", self.os2()));
        }
        if self.with_glyf {
            let (glyf, loca) = self.glyf_loca();
            tables.push((*b"glyf", glyf));
            tables.push((*b"loca", loca));
        }
        assemble(tables)
    }

    fn head(&self) -> Vec<u8> {
        let mut t = Vec::new();
        put32(&mut t, 0x0001_0000);
        put32(&mut t, 0x0001_0000);
        put32(&mut t, 0);
        put32(&mut t, 0x5F0F_3CF5);
        put16(&mut t, 0);
        put16(&mut t, self.units_per_em);
        t.extend_from_slice(&[0; 16]);
        for v in self.bbox {
            put16(&mut t, v as u16);
        }
        put16(&mut t, if self.italic_angle != 0 { 2 } else { 0 }); // macStyle
        put16(&mut t, 8);
        put16(&mut t, 2);
        put16(&mut t, 1); // indexToLocFormat: long
        put16(&mut t, 0);
        t
    }

    fn hhea(&self) -> Vec<u8> {
        let mut t = Vec::new();
        put32(&mut t, 0x0001_0000);
        put16(&mut t, self.ascent as u16);
        put16(&mut t, self.descent as u16);
        put16(&mut t, self.line_gap as u16);
        let max = self.glyphs.iter().map(TestGlyph::advance).max().unwrap_or(0);
        put16(&mut t, max);
        t.extend_from_slice(&[0; 22]);
        put16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn maxp(&self) -> Vec<u8> {
        let mut t = Vec::new();
        put32(&mut t, 0x0000_5000);
        put16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut t = Vec::new();
        for glyph in &self.glyphs {
            put16(&mut t, glyph.advance());
            put16(&mut t, 0);
        }
        t
    }

    fn cmap(&self) -> Vec<u8> {
        let mut bmp: Vec<(u16, u16)> = self
            .chars
            .iter()
            .filter(|(c, _)| (*c as u32) < 0xFFFF)
            .map(|(c, g)| (*c as u32 as u16, *g))
            .collect();
        bmp.sort();
        let needs_f12 = self.chars.iter().any(|(c, _)| (*c as u32) > 0xFFFF);

        let seg_count = bmp.len() + 1;
        let mut f4 = Vec::new();
        put16(&mut f4, 4);
        put16(&mut f4, (16 + seg_count * 8) as u16);
        put16(&mut f4, 0);
        put16(&mut f4, (seg_count * 2) as u16);
        let selector = 15 - (seg_count as u16).leading_zeros() as u16;
        let range = 2 * (1u16 << selector);
        put16(&mut f4, range);
        put16(&mut f4, selector);
        put16(&mut f4, (seg_count as u16 * 2).saturating_sub(range));
        for (code, _) in &bmp {
            put16(&mut f4, *code);
        }
        put16(&mut f4, 0xFFFF);
        put16(&mut f4, 0);
        for (code, _) in &bmp {
            put16(&mut f4, *code);
        }
        put16(&mut f4, 0xFFFF);
        for (code, gid) in &bmp {
            put16(&mut f4, gid.wrapping_sub(*code));
        }
        put16(&mut f4, 1);
        for _ in 0..seg_count {
            put16(&mut f4, 0);
        }

        let mut f12 = Vec::new();
        if needs_f12 {
            let mut all: Vec<(u32, u16)> =
                self.chars.iter().map(|(c, g)| (*c as u32, *g)).collect();
            all.sort();
            put16(&mut f12, 12);
            put16(&mut f12, 0);
            put32(&mut f12, (16 + all.len() * 12) as u32);
            put32(&mut f12, 0);
            put32(&mut f12, all.len() as u32);
            for (code, gid) in all {
                put32(&mut f12, code);
                put32(&mut f12, code);
                put32(&mut f12, gid as u32);
            }
        }

        let records = if needs_f12 { 2u16 } else { 1 };
        let mut t = Vec::new();
        put16(&mut t, 0);
        put16(&mut t, records);
        let f4_offset = 4 + records as u32 * 8;
        put16(&mut t, 3);
        put16(&mut t, 1);
        put32(&mut t, f4_offset);
        if needs_f12 {
            put16(&mut t, 3);
            put16(&mut t, 10);
            put32(&mut t, f4_offset + f4.len() as u32);
        }
        t.extend_from_slice(&f4);
        t.extend_from_slice(&f12);
        t
    }

    fn name_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        let Some(name) = &self.postscript_name else {
            put16(&mut t, 0);
            put16(&mut t, 0);
            put16(&mut t, 6);
            return t;
        };
        let encoded: Vec<u8> = name.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        put16(&mut t, 0);
        put16(&mut t, 1);
        put16(&mut t, 6 + 12);
        put16(&mut t, 3);
        put16(&mut t, 1);
        put16(&mut t, 0x409);
        put16(&mut t, 6);
        put16(&mut t, encoded.len() as u16);
        put16(&mut t, 0);
        t.extend_from_slice(&encoded);
        t
    }

    fn post(&self) -> Vec<u8> {
        let mut t = Vec::new();
        put32(&mut t, 0x0003_0000);
        put32(&mut t, self.italic_angle as u32);
        put16(&mut t, (-100i16) as u16);
        put16(&mut t, 50);
        put32(&mut t, self.fixed_pitch as u32);
        t.extend_from_slice(&[0; 16]);
        t
    }

    fn os2(&self) -> Vec<u8> {
        let mut t = vec![0u8; 96];
        t[0..2].copy_from_slice(&2u16.to_be_bytes());
        t[4..6].copy_from_slice(&self.weight_class.to_be_bytes());
        t[68..70].copy_from_slice(&self.ascent.to_be_bytes());
        t[70..72].copy_from_slice(&self.descent.to_be_bytes());
        t[72..74].copy_from_slice(&self.line_gap.to_be_bytes());
        t[86..88].copy_from_slice(&self.x_height.to_be_bytes());
        t[88..90].copy_from_slice(&self.cap_height.to_be_bytes());
        t
    }

    fn glyf_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for glyph in &self.glyphs {
            put32(&mut loca, glyf.len() as u32);
            glyf.extend_from_slice(&glyph.outline());
        }
        put32(&mut loca, glyf.len() as u32);
        (glyf, loca)
    }
}

/// `.notdef` plus H (gid 1, advance 700) and i (gid 2, advance 300) at 1000 upem.
pub fn hello_font() -> Vec<u8> {
    TestFont::new(1000)
        .simple(700)
        .simple(300)
        .map('H', 1)
        .map('i', 2)
        .build()
}

/// Glyphs 0..=n with advance 500, mapping 'A'.. to 1..=n.
pub fn alphabet_font(n: u16) -> TestFont {
    let mut font = TestFont::new(1000);
    for i in 1..=n {
        font = font.simple(500).map(char::from_u32(0x40 + i as u32).unwrap_or('?'), i);
    }
    font
}

fn assemble(mut tables: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = Vec::new();
    put32(&mut out, 0x0001_0000);
    put16(&mut out, tables.len() as u16);
    out.extend_from_slice(&[0; 6]);
    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &tables {
        out.extend_from_slice(tag);
        put32(&mut out, 0);
        put32(&mut out, offset as u32);
        put32(&mut out, data.len() as u32);
        offset += (data.len() + 3) & !3;
    }
    for (_, data) in &tables {
        out.extend_from_slice(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    out
}

fn put16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
