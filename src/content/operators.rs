//! PDF content stream operators.
//!
//! The subset needed to track text positioning per ISO 32000-1:2008
//! Section 9.4: text object brackets, the text state, the text-showing
//! operators, and the graphics-state operators that affect coordinates.

/// An element of a `TJ` array: either bytes to show or a position
/// adjustment in thousandths of an em.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// Text bytes to show
    Text(Vec<u8>),
    /// Positioning adjustment (subtracted from the current position)
    Offset(f32),
}

/// A content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,

    /// Move text position (Td)
    Td {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Move text position and set leading (TD)
    TD {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Set text matrix (Tm)
    Tm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },
    /// Move to start of next line (T*)
    TStar,

    /// Set text leading (TL)
    TL {
        /// Text leading
        leading: f32,
    },
    /// Set character spacing (Tc)
    Tc {
        /// Character spacing
        char_space: f32,
    },
    /// Set word spacing (Tw)
    Tw {
        /// Word spacing
        word_space: f32,
    },
    /// Set horizontal scaling (Tz)
    Tz {
        /// Horizontal scaling percentage
        scale: f32,
    },
    /// Set font and size (Tf)
    Tf {
        /// Font resource name
        font: String,
        /// Font size
        size: f32,
    },

    /// Show text string (Tj)
    Tj {
        /// Text to show (byte array)
        text: Vec<u8>,
    },
    /// Show text with individual glyph positioning (TJ)
    TJ {
        /// Array of text strings and positioning adjustments
        array: Vec<TextElement>,
    },
    /// Move to next line and show text (')
    Quote {
        /// Text to show
        text: Vec<u8>,
    },
    /// Set spacing, move to next line and show text (")
    DoubleQuote {
        /// Word spacing
        word_space: f32,
        /// Character spacing
        char_space: f32,
        /// Text to show
        text: Vec<u8>,
    },

    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Modify current transformation matrix (cm)
    Cm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },

    /// Any other operator, kept as a marker with operands dropped
    Raw {
        /// Operator name as it appeared in the stream
        name: String,
    },
}
