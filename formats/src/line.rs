//! Decode one logical line of an ACMI stream into its typed form.
//!
//! Four kinds of lines exist: time frames (`#offset`), global reference
//! headers (`0,KEY=VALUE`), removals (`-hexid`) and object updates
//! (`hexid,T=coords[,KEY=VALUE]*`).  The `T=` block is positional with `|`
//! separators, and its field count decides which semantic keys apply.
//!

use nom::{
    character::complete::{char, hex_digit1},
    combinator::{all_consuming, map_res},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult,
};
use thiserror::Error;

/// Everything that can go wrong while decoding a single line.
///
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,
    #[error("bad tacview id in `{0}`")]
    BadId(String),
    #[error("bad float `{0}`")]
    BadFloat(String),
    #[error("unexpected coordinate count {0}")]
    BadCoordCount(usize),
    #[error("no `=` in chunk `{0}`")]
    MissingSeparator(String),
    #[error("missing T= block in `{0}`")]
    MissingCoords(String),
}

/// One decoded line.
///
#[derive(Clone, Debug, PartialEq)]
pub enum RawLine<'a> {
    /// `#offset` — advance the session clock.
    TimeFrame(f64),
    /// `0,KEY=VALUE` — global reference data.
    Header(Vec<(&'a str, &'a str)>),
    /// `-hexid` — the object is gone.
    Removal(u64),
    /// `hexid,T=…` — an object observation.
    Update(Update<'a>),
}

/// An object observation: id, positional coordinates, free-form fields.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Update<'a> {
    pub tac_id: u64,
    pub coords: CoordSet,
    pub fields: Vec<(&'a str, &'a str)>,
}

/// The positional `T=` values.  `None` means the field was empty on the
/// wire and the record keeps its previous value.  `lon`/`lat` are still
/// deltas here; the session folds in the reference offsets.
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordSet {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub alt: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub u_coord: Option<f64>,
    pub v_coord: Option<f64>,
    pub heading: Option<f64>,
}

#[derive(Copy, Clone, Debug)]
enum CoordField {
    Lon,
    Lat,
    Alt,
    Roll,
    Pitch,
    Yaw,
    UCoord,
    VCoord,
    Heading,
}

/// Decode one line, stripped of its newline.
///
pub fn parse_line(input: &str) -> Result<RawLine, DecodeError> {
    let line = input.trim_end();
    match line.bytes().next() {
        None => Err(DecodeError::Empty),
        Some(b'#') => timeframe(line),
        Some(b'-') => removal(line),
        _ => {
            if let Some(rest) = line.strip_prefix("0,") {
                Ok(RawLine::Header(kv_pairs(rest)?))
            } else if !line.contains(',') && line.contains('=') {
                // Recordings open with bare FileType=/FileVersion= lines.
                Ok(RawLine::Header(kv_pairs(line)?))
            } else {
                update(line)
            }
        }
    }
}

fn hex_id(input: &str) -> IResult<&str, u64> {
    map_res(hex_digit1, |s: &str| u64::from_str_radix(s, 16))(input)
}

fn timeframe(line: &str) -> Result<RawLine, DecodeError> {
    let r: IResult<&str, f64> = all_consuming(preceded(char('#'), double))(line);
    match r {
        Ok((_, offset)) => Ok(RawLine::TimeFrame(offset)),
        Err(_) => Err(DecodeError::BadFloat(line.to_owned())),
    }
}

fn removal(line: &str) -> Result<RawLine, DecodeError> {
    let r: IResult<&str, u64> = all_consuming(preceded(char('-'), hex_id))(line);
    match r {
        Ok((_, id)) => Ok(RawLine::Removal(id)),
        Err(_) => Err(DecodeError::BadId(line.to_owned())),
    }
}

fn update(line: &str) -> Result<RawLine, DecodeError> {
    let (rest, tac_id) =
        terminated(hex_id, char(','))(line).map_err(|_| DecodeError::BadId(line.to_owned()))?;

    let mut chunks = rest.split(',');
    let coords = match chunks.next().and_then(|c| c.strip_prefix("T=")) {
        Some(val) => coords(val)?,
        None => return Err(DecodeError::MissingCoords(line.to_owned())),
    };

    // Values may contain `=` themselves, split on the first one only.
    //
    let fields = chunks
        .map(|chunk| {
            chunk
                .split_once('=')
                .ok_or_else(|| DecodeError::MissingSeparator(chunk.to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawLine::Update(Update {
        tac_id,
        coords,
        fields,
    }))
}

fn kv_pairs(rest: &str) -> Result<Vec<(&str, &str)>, DecodeError> {
    rest.split(',')
        .map(|chunk| {
            chunk
                .split_once('=')
                .ok_or_else(|| DecodeError::MissingSeparator(chunk.to_owned()))
        })
        .collect()
}

/// The field count of the `|`-separated block decides the semantic mapping.
///
fn coords(val: &str) -> Result<CoordSet, DecodeError> {
    use CoordField::*;

    let parts: Vec<&str> = val.split('|').collect();
    let order: &[CoordField] = match parts.len() {
        9 => &[Lon, Lat, Alt, Roll, Pitch, Yaw, UCoord, VCoord, Heading],
        6 => &[Lon, Lat, Alt, Roll, Pitch, Yaw],
        5 => &[Lon, Lat, Alt, UCoord, VCoord],
        3 => &[Lon, Lat, Alt],
        n => return Err(DecodeError::BadCoordCount(n)),
    };

    let mut cs = CoordSet::default();
    for (part, field) in parts.iter().zip(order) {
        // Empty positional fields are preserved-as-missing.
        if part.is_empty() {
            continue;
        }
        let v: f64 = part
            .parse()
            .map_err(|_| DecodeError::BadFloat((*part).to_owned()))?;
        match field {
            Lon => cs.lon = Some(v),
            Lat => cs.lat = Some(v),
            Alt => cs.alt = Some(v),
            Roll => cs.roll = Some(v),
            Pitch => cs.pitch = Some(v),
            Yaw => cs.yaw = Some(v),
            UCoord => cs.u_coord = Some(v),
            VCoord => cs.v_coord = Some(v),
            Heading => cs.heading = Some(v),
        }
    }
    Ok(cs)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("#87.2", 87.2)]
    #[case("#0", 0.0)]
    #[case("#1.01", 1.01)]
    fn test_timeframe(#[case] input: &str, #[case] offset: f64) {
        assert_eq!(Ok(RawLine::TimeFrame(offset)), parse_line(input));
    }

    #[test]
    fn test_removal() {
        assert_eq!(Ok(RawLine::Removal(0xb01)), parse_line("-b01"));
    }

    #[test]
    fn test_removal_bad_hex() {
        assert!(matches!(parse_line("-zz"), Err(DecodeError::BadId(_))));
    }

    #[test]
    fn test_header() {
        let parsed = parse_line("0,ReferenceLatitude=35.1").unwrap();
        assert_eq!(RawLine::Header(vec![("ReferenceLatitude", "35.1")]), parsed);
    }

    #[test]
    fn test_bare_file_header() {
        let parsed = parse_line("FileType=text/acmi/tacview").unwrap();
        assert_eq!(
            RawLine::Header(vec![("FileType", "text/acmi/tacview")]),
            parsed
        );
    }

    #[test]
    fn test_update_full_nine_fields() {
        let line = "802,T=6.3596289|5.139203|342.67|||7.3|729234.25|-58312.28|,\
                    Type=Ground+Static+Aerodrome,Name=FARP,Color=Blue,\
                    Coalition=Enemies,Country=us";
        let parsed = parse_line(line).unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(0x802, up.tac_id);
        assert_eq!(Some(6.3596289), up.coords.lon);
        assert_eq!(Some(5.139203), up.coords.lat);
        assert_eq!(Some(342.67), up.coords.alt);
        assert_eq!(None, up.coords.roll);
        assert_eq!(None, up.coords.pitch);
        assert_eq!(Some(7.3), up.coords.yaw);
        assert_eq!(Some(729234.25), up.coords.u_coord);
        assert_eq!(Some(-58312.28), up.coords.v_coord);
        assert_eq!(None, up.coords.heading);
        assert_eq!(5, up.fields.len());
        assert_eq!(("Name", "FARP"), up.fields[1]);
    }

    #[test]
    fn test_update_three_fields() {
        let parsed = parse_line("102,T=1.0|2.0|100").unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(0x102, up.tac_id);
        assert_eq!(Some(100.0), up.coords.alt);
        assert!(up.fields.is_empty());
    }

    #[test]
    fn test_update_five_fields_u_v() {
        let parsed = parse_line("76502,T=6.6632117|4.8577435|6640.74|-57047.37|76446.19").unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(Some(6640.74), up.coords.alt);
        assert_eq!(Some(-57047.37), up.coords.u_coord);
        assert_eq!(Some(76446.19), up.coords.v_coord);
        assert_eq!(None, up.coords.yaw);
    }

    #[test]
    fn test_update_missing_lon() {
        let parsed = parse_line("103,T=|3.0|50").unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(None, up.coords.lon);
        assert_eq!(Some(3.0), up.coords.lat);
        assert_eq!(Some(50.0), up.coords.alt);
    }

    #[test]
    fn test_update_negative_altitude() {
        let parsed = parse_line("4001,T=6.96369|4.0232604|-2||").unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(Some(-2.0), up.coords.alt);
    }

    #[rstest]
    #[case("1,T=1|2", 2)]
    #[case("1,T=1|2|3|4", 4)]
    #[case("1,T=1|2|3|4|5|6|7", 7)]
    fn test_bad_coord_count(#[case] input: &str, #[case] n: usize) {
        assert_eq!(Err(DecodeError::BadCoordCount(n)), parse_line(input));
    }

    #[test]
    fn test_value_with_equals_sign() {
        let parsed = parse_line("802,T=1|2|3,Pilot=Call=sign").unwrap();
        let up = match parsed {
            RawLine::Update(up) => up,
            _ => panic!("expected an update"),
        };
        assert_eq!(("Pilot", "Call=sign"), up.fields[0]);
    }

    #[test]
    fn test_chunk_without_separator_fails() {
        assert!(matches!(
            parse_line("802,T=1|2|3,Pilot"),
            Err(DecodeError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_update_without_coords_fails() {
        assert!(matches!(
            parse_line("802,Name=FARP"),
            Err(DecodeError::MissingCoords(_))
        ));
    }

    #[test]
    fn test_bad_hex_id_fails() {
        assert!(matches!(
            parse_line("zz,T=1|2|3"),
            Err(DecodeError::BadId(_))
        ));
    }

    #[test]
    fn test_empty_line_fails() {
        assert_eq!(Err(DecodeError::Empty), parse_line(""));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let line = "802,T=1.5|2.5|300,Type=Air+FixedWing";
        assert_eq!(parse_line(line), parse_line(line));
    }
}
