//! Paginated output.
//!
//! A [`PageDocument`] is an ordered list of rendered pages. It writes
//! itself as a PDF with one page per raster, each page exactly the raster
//! size in points with the raster drawn as a full-page image.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj  Catalog
//! 2 0 obj  Pages
//! 3 0 obj  Info
//! per page: Page, content stream, image XObject
//! xref / trailer / %%EOF
//! ```

use chrono::Utc;
use miniz_oxide::deflate::compress_to_vec_zlib;
use std::io::Write;

use crate::renderer::Raster;

/// One rendered page and the recipe it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub recipe_id: String,
    pub raster: Raster,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDocument {
    pub pages: Vec<Page>,
}

const FIRST_PAGE_OBJECT: usize = 4;
const OBJECTS_PER_PAGE: usize = 3;

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recipe_id: impl Into<String>, raster: Raster) {
        self.pages.push(Page {
            recipe_id: recipe_id.into(),
            raster,
        });
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Recipe ids in page order.
    pub fn recipe_ids(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.recipe_id.as_str()).collect()
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        // Index 0 is the free-list head and is never written.
        let mut objects: Vec<Vec<u8>> = vec![Vec::new()];

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + i * OBJECTS_PER_PAGE))
            .collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .into_bytes(),
        );

        objects.push(
            format!(
                "<< /Producer (RecipeKit {}) /CreationDate (D:{}) >>",
                env!("CARGO_PKG_VERSION"),
                Utc::now().format("%Y%m%d%H%M%S")
            )
            .into_bytes(),
        );

        for (i, page) in self.pages.iter().enumerate() {
            let page_id = FIRST_PAGE_OBJECT + i * OBJECTS_PER_PAGE;
            let (w, h) = (page.raster.width(), page.raster.height());

            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] \
                     /Resources << /XObject << /Im0 {} 0 R >> >> /Contents {} 0 R >>",
                    page_id + 2,
                    page_id + 1
                )
                .into_bytes(),
            );

            let content = format!("q {w} 0 0 {h} 0 0 cm /Im0 Do Q");
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let mut stream = Vec::new();
            let _ = write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);

            let rgb = compress_to_vec_zlib(&page.raster.rgb_bytes(), 6);
            let mut image = Vec::new();
            let _ = write!(
                image,
                "<< /Type /XObject /Subtype /Image \
                 /Width {w} /Height {h} \
                 /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 \
                 /Filter /FlateDecode \
                 /Length {} >>\nstream\n",
                rgb.len()
            );
            image.extend_from_slice(&rgb);
            image.extend_from_slice(b"\nendstream");
            objects.push(image);
        }

        serialize(&objects)
    }
}

fn serialize(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets = vec![0usize; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, data) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{i} 0 obj\n");
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info 3 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len()
    );
    output
}
