use serde::{Deserialize, Serialize};

/// A scraped movie: one row of the movie CSV
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Title as shown on the detail page
    #[serde(rename = "Movie Name")]
    pub title: String,
    /// Plot summary
    #[serde(rename = "Storyline", default)]
    pub storyline: String,
}

/// A movie with its normalized storyline: one row of the cleaned CSV
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanedMovie {
    #[serde(rename = "Movie Name")]
    pub title: String,
    #[serde(rename = "Storyline", default)]
    pub storyline: String,
    #[serde(rename = "Cleaned_Storyline", default)]
    pub cleaned_storyline: String,
}

impl Movie {
    pub fn new(title: impl Into<String>, storyline: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            storyline: storyline.into(),
        }
    }

    /// Attaches the normalized storyline
    pub fn cleaned(&self, cleaned_storyline: String) -> CleanedMovie {
        CleanedMovie {
            title: self.title.clone(),
            storyline: self.storyline.clone(),
            cleaned_storyline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_csv_column_names() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(Movie::new("Wiz", "a young wizard"))
            .unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(output, "Movie Name,Storyline\nWiz,a young wizard\n");
    }

    #[test]
    fn test_cleaned_keeps_raw_fields() {
        let movie = Movie::new("Wiz", "A young wizard!");
        let cleaned = movie.cleaned("young wizard".to_string());

        assert_eq!(cleaned.title, "Wiz");
        assert_eq!(cleaned.storyline, "A young wizard!");
        assert_eq!(cleaned.cleaned_storyline, "young wizard");
    }
}
