use crate::{csv, json};

#[derive(Debug, serde::Deserialize)]
pub enum ReaderOptions {
    #[serde(rename = "json")]
    Json(json::reader::Options),
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions::Json(Default::default())
    }
}

#[derive(Debug, serde::Deserialize)]
pub enum WriterOptions {
    #[serde(rename = "csv")]
    Csv(csv::writer::Options),
    #[serde(rename = "json")]
    Json(json::writer::Options),
}

impl WriterOptions {
    pub fn write<W, R>(self, writer: W, reader: R) -> crate::Result<()>
    where
        W: std::io::Write,
        R: crate::Reader,
    {
        match self {
            WriterOptions::Csv(opts) => csv::writer::write(writer, reader, opts),
            WriterOptions::Json(opts) => json::writer::write(writer, reader, opts),
        }
    }
}

#[test]
fn parse_reader_options() {
    let opts: ReaderOptions =
        serde_json::from_str(r#"{"json": {"flatten": {"arrays": "index"}}}"#).unwrap();
    let ReaderOptions::Json(opts) = opts;

    assert_eq!(
        opts.flatten.map(|f| f.arrays),
        Some(crate::flatten::ArrayMode::Index)
    );
}

#[test]
fn parse_writer_options() {
    let tsv: WriterOptions = serde_json::from_str(r#"{"csv": {"delimiter": 9}}"#).unwrap();
    assert!(matches!(tsv, WriterOptions::Csv(ref o) if o.delimiter == b'\t'));

    let pretty: WriterOptions = serde_json::from_str(r#"{"json": {"mode": "pretty"}}"#).unwrap();
    assert!(matches!(
        pretty,
        WriterOptions::Json(ref o) if o.mode == json::writer::Mode::ArrayPretty
    ));

    assert!(serde_json::from_str::<WriterOptions>(r#"{"xml": {}}"#).is_err());
}
