// src/noyau/jetons.rs

use std::fmt;

/// Opérateurs binaires du pavé.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^
}

impl Operator {
    /// Reconnaît un opérateur : forme ASCII ou glyphe du pavé (− × ÷).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '-' | '−' => Some(Self::Minus),
            '*' | '×' => Some(Self::Star),
            '/' | '÷' => Some(Self::Slash),
            '^' => Some(Self::Caret),
            _ => None,
        }
    }

    /// additif = 1, multiplicatif = 2, puissance = 3
    pub fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Star | Self::Slash => 2,
            Self::Caret => 3,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, Self::Caret)
    }

    /// Forme de stockage (ASCII) : c’est elle qui part dans l’historique.
    pub fn symbole(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Star => '*',
            Self::Slash => '/',
            Self::Caret => '^',
        }
    }

    /// Forme d’affichage (pavé).
    pub fn glyphe(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '−',
            Self::Star => '×',
            Self::Slash => '÷',
            Self::Caret => '^',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbole())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Littéral décimal, séparateur canonique '.', au plus un séparateur.
    Num(String),
    Op(Operator),
    LPar,
    RPar,
}

fn est_separateur(c: char) -> bool {
    c == '.' || c == ','
}

/// Tokenize une chaîne en jetons.
///
/// - chiffres + un séparateur ('.' ou ',') => littéral (séparateur normalisé en '.')
/// - un second séparateur dans le même littéral est ignoré
/// - espace : vide le tampon, sans jeton
/// - opérateur / parenthèse : vide le tampon puis jeton propre
/// - '-' en position d’opérande, collé à un chiffre : littéral signé ("-3", "2*-3")
/// - tout le reste est ignoré (pas d’erreur ici : le malformé ressort à l’évaluation)
pub fn tokenize(s: &str) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    let mut tampon = String::new();
    let chars: Vec<char> = s.chars().collect();

    fn vider(tampon: &mut String, out: &mut Vec<Token>) {
        if !tampon.is_empty() {
            out.push(Token::Num(std::mem::take(tampon)));
        }
    }

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            tampon.push(c);
            continue;
        }

        if est_separateur(c) {
            if !tampon.contains('.') {
                tampon.push('.');
            }
            continue;
        }

        if c.is_whitespace() {
            vider(&mut tampon, &mut out);
            continue;
        }

        if let Some(op) = Operator::from_char(c) {
            vider(&mut tampon, &mut out);

            // moins collé à un chiffre, là où on attend une valeur => signe du littéral
            let attend_valeur = matches!(out.last(), None | Some(Token::Op(_)) | Some(Token::LPar));
            let suivi_chiffre = chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_digit() || est_separateur(*n));
            if op == Operator::Minus && attend_valeur && suivi_chiffre {
                tampon.push('-');
                continue;
            }

            out.push(Token::Op(op));
            continue;
        }

        match c {
            '(' => {
                vider(&mut tampon, &mut out);
                out.push(Token::LPar);
            }
            ')' => {
                vider(&mut tampon, &mut out);
                out.push(Token::RPar);
            }
            _ => {} // caractère inconnu : ignoré
        }
    }

    vider(&mut tampon, &mut out);
    out
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Token::Num(n) => n.clone(),
            Token::Op(op) => op.to_string(),
            Token::LPar => "(".to_string(),
            Token::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
