//! The [post (PostScript)](https://docs.microsoft.com/en-us/typography/opentype/spec/post) table

use types::{BigEndian, Fixed, GlyphId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [post](https://docs.microsoft.com/en-us/typography/opentype/spec/post)
/// table.
#[derive(Clone, Debug)]
pub struct Post<'a> {
    data: FontData<'a>,
    glyph_name_index: &'a [BigEndian<u16>],
    // `None` marks a stored name that is not valid ascii
    string_data: Vec<Option<&'a str>>,
}

impl TopLevelTable for Post<'_> {
    const TAG: Tag = Tag::new(b"post");
}

impl<'a> FontRead<'a> for Post<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_in_bounds(Self::HEADER_LEN)?;
        let mut post = Post {
            data,
            glyph_name_index: &[],
            string_data: Vec::new(),
        };
        if post.version() == Self::VERSION_2_0 {
            let mut cursor = data.cursor();
            cursor.advance_by(Self::HEADER_LEN);
            let num_glyphs: u16 = cursor.read()?;
            post.glyph_name_index = cursor.read_array(num_glyphs as usize)?;
            while cursor.remaining_bytes() > 0 {
                let len: u8 = cursor.read()?;
                let bytes = cursor.read_bytes(len as usize)?;
                let name = std::str::from_utf8(bytes).ok().filter(|s| s.is_ascii());
                post.string_data.push(name);
            }
        }
        Ok(post)
    }
}

impl<'a> Post<'a> {
    pub const VERSION_1_0: Fixed = Fixed::from_bits(0x0001_0000);
    pub const VERSION_2_0: Fixed = Fixed::from_bits(0x0002_0000);
    pub const VERSION_3_0: Fixed = Fixed::from_bits(0x0003_0000);
    const HEADER_LEN: usize = 32;

    pub fn version(&self) -> Fixed {
        self.data.read_at(0).unwrap_or_default()
    }

    pub fn italic_angle(&self) -> Fixed {
        self.data.read_at(4).unwrap_or_default()
    }

    pub fn underline_position(&self) -> i16 {
        self.data.read_at(8).unwrap_or_default()
    }

    pub fn underline_thickness(&self) -> i16 {
        self.data.read_at(10).unwrap_or_default()
    }

    pub fn is_fixed_pitch(&self) -> u32 {
        self.data.read_at(12).unwrap_or_default()
    }

    /// The number of names this table can resolve.
    pub fn num_names(&self) -> usize {
        match self.version() {
            Self::VERSION_1_0 => DEFAULT_GLYPH_NAMES.len(),
            Self::VERSION_2_0 => self.glyph_name_index.len(),
            _ => 0,
        }
    }

    /// The name of the glyph, if this version of the table stores names.
    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&'a str> {
        let glyph_id = glyph_id.to_usize();
        match self.version() {
            Self::VERSION_1_0 => DEFAULT_GLYPH_NAMES.get(glyph_id).copied(),
            Self::VERSION_2_0 => {
                let idx = self.glyph_name_index.get(glyph_id)?.get() as usize;
                if idx < DEFAULT_GLYPH_NAMES.len() {
                    return DEFAULT_GLYPH_NAMES.get(idx).copied();
                }
                self.string_data
                    .get(idx - DEFAULT_GLYPH_NAMES.len())
                    .copied()
                    .flatten()
            }
            _ => None,
        }
    }
}

/// The 258 glyph names defined for Macintosh TrueType fonts
#[rustfmt::skip]
pub static DEFAULT_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign", "dollar",
    "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma",
    "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B",
    "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis",
    "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute",
    "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase",
    "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave",
    "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
    "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve",
    "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn",
    "thorn", "minus", "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf",
    "onequarter", "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla",
    "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];
