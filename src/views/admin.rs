use super::{Head, base_document, format_date, inline_data};
use crate::types::{Article, ArticleImage, ProductPin};
use crate::upload::{HERO_FIELD, IMAGES_FIELD, MAX_ARTICLE_IMAGES};
use maud::{Markup, html};

/// Dashboard row: an article and how many pins it carries.
#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub article: Article,
    pub pin_count: usize,
}

/// Message for a `?flash=` code set by a redirect. Unknown codes show nothing.
pub fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "artigo-criado" => Some("Artigo publicado com sucesso."),
        "artigo-atualizado" => Some("Artigo atualizado com sucesso."),
        _ => None,
    }
}

fn admin_header() -> Markup {
    html! {
        header.site-header {
            div {
                a.site-brand href="/admin" { "Habitare · Admin" }
            }
            nav.site-nav {
                ul {
                    li { a href="/admin" { "Painel" } }
                    li { a href="/" target="_blank" rel="noopener" { "Ver site" } }
                    li {
                        form method="post" action="/admin/logout" {
                            button.link-button type="submit" { "Sair" }
                        }
                    }
                }
            }
        }
    }
}

pub fn login(redirect: &str, failed: bool) -> Markup {
    let head = Head::admin("Login - Admin Habitare");
    let content = html! {
        main {
            section.login-box {
                h1 { "Admin Habitare" }
                @if failed {
                    p.flash.flash--error { "Usuário ou senha inválidos." }
                }
                form.admin-form method="post" action="/admin/login" {
                    input type="hidden" name="redirect" value=(redirect);
                    label {
                        "Usuário"
                        input type="text" name="username" autocomplete="username" required;
                    }
                    label {
                        "Senha"
                        input type="password" name="password" autocomplete="current-password" required;
                    }
                    button type="submit" { "Entrar" }
                }
            }
        }
    };
    base_document(&head, None, content)
}

/// Fields shared by the create and edit forms. `article` pre-fills them.
fn article_fields(article: Option<&Article>) -> Markup {
    let title = article.map(|a| a.title.as_str()).unwrap_or_default();
    let body = article.and_then(|a| a.body_html.as_deref()).unwrap_or_default();
    let hero = article.and_then(|a| a.hero_image.as_deref()).unwrap_or_default();
    html! {
        label {
            "Título"
            input type="text" name="title" required value=(title);
        }
        label {
            "Texto da matéria"
            textarea name="body_text" required { (body) }
        }
        label {
            "URL da imagem principal"
            input type="text" name="hero_image_url" placeholder="https://" value=(hero);
        }
        label {
            "Ou envie a imagem principal"
            input type="file" name=(HERO_FIELD) accept="image/*";
        }
        label {
            "Imagens do carrossel (até " (MAX_ARTICLE_IMAGES) ")"
            input type="file" name=(IMAGES_FIELD) accept="image/*" multiple;
        }
    }
}

pub fn dashboard(rows: &[ArticleRow], flash: Option<&str>) -> Markup {
    let head = Head::admin("Painel editorial Habitare");
    let content = html! {
        (admin_header())
        main {
            h1 { "Painel editorial" }
            @if let Some(message) = flash.and_then(flash_message) {
                p.flash { (message) }
            }
            div.admin-grid {
                section {
                    h2 { "Nova matéria" }
                    form.admin-form method="post" action="/admin/articles" enctype="multipart/form-data" {
                        (article_fields(None))
                        button type="submit" { "Publicar" }
                    }
                }
                section {
                    h2 { "Matérias publicadas" }
                    @if rows.is_empty() {
                        p { "Nenhuma matéria ainda." }
                    } @else {
                        table.admin-table {
                            thead {
                                tr {
                                    th { "Título" }
                                    th { "Data" }
                                    th { "Pins" }
                                    th { "Ações" }
                                }
                            }
                            tbody {
                                @for row in rows {
                                    (dashboard_row(row))
                                }
                            }
                        }
                    }
                }
            }
        }
        script src="/js/admin.js" defer {}
    };
    base_document(&head, None, content)
}

fn dashboard_row(row: &ArticleRow) -> Markup {
    let article = &row.article;
    let base = format!("/admin/articles/{}", article.id);
    html! {
        tr data-article-row {
            td {
                a href={ "/artigos/" (article.slug) } target="_blank" rel="noopener" { (article.title) }
            }
            td { (article.published_at.as_deref().map(format_date).unwrap_or_default()) }
            td { (row.pin_count) }
            td.admin-actions {
                a href={ (base) "/edit" } { "Editar" }
                a href={ (base) "/pins" } { "Pins" }
                button.danger type="button" data-delete-article=(base) data-title=(article.title) {
                    "Excluir"
                }
            }
        }
    }
}

pub fn edit(article: &Article, images: &[ArticleImage]) -> Markup {
    let title = format!("Editar — {}", article.title);
    let head = Head::admin(&title);
    let content = html! {
        (admin_header())
        main {
            h1 { "Editar matéria" }
            form.admin-form method="post" action={ "/admin/articles/" (article.id) } enctype="multipart/form-data" {
                (article_fields(Some(article)))
                label {
                    "Categoria"
                    input type="text" name="category" value=(article.category.as_deref().unwrap_or_default());
                }
                label {
                    "Autor"
                    input type="text" name="author" value=(article.author.as_deref().unwrap_or_default());
                }
                label {
                    "Função do autor"
                    input type="text" name="author_role" value=(article.author_role.as_deref().unwrap_or_default());
                }
                div.admin-actions {
                    button type="submit" { "Salvar alterações" }
                    a href="/admin" { "Cancelar" }
                }
            }
            @if !images.is_empty() {
                section {
                    h2 { "Imagens do carrossel" }
                    ul.pin-list {
                        @for image in images {
                            li {
                                a href=(image.image_url) target="_blank" rel="noopener" { (image.image_url) }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(&head, None, content)
}

/// Pin editor. The current pins are handed to `admin-pins.js` inline.
pub fn pins(article: &Article, pins: &[ProductPin]) -> Markup {
    let title = format!("Pins — {}", article.title);
    let head = Head::admin(&title);
    let endpoint = format!("/admin/articles/{}/pins", article.id);
    let content = html! {
        (admin_header())
        main {
            h1 { "Pins de " (article.title) }
            p { "Clique na imagem para posicionar o pin selecionado ou arraste os pontos." }
            div.pin-editor data-pin-editor data-save-endpoint=(endpoint) {
                div.pin-canvas {
                    @if let Some(src) = &article.hero_image {
                        img src=(src) alt=(article.title) data-pin-image;
                    }
                    div.pin-layer data-pin-layer {}
                }
                aside {
                    div.pin-toolbar {
                        button type="button" data-add-pin { "Adicionar pin" }
                        button type="button" data-delete-pin { "Remover pin" }
                        button type="button" data-save-pin { "Salvar pins" }
                    }
                    div.pin-list data-pin-list {}
                    p.pin-coordinates {
                        "X: " span data-display="x" { "0%" }
                        " · Y: " span data-display="y" { "0%" }
                    }
                    form.admin-form data-pin-form onsubmit="return false" {
                        label { "Nome" input type="text" data-field="name"; }
                        label { "Descrição" textarea data-field="description" {} }
                        label { "Preço" input type="text" data-field="price_label"; }
                        label { "Selo" input type="text" data-field="badge"; }
                        label { "Link do produto" input type="text" data-field="cta_path"; }
                        label { "Código de rastreio" input type="text" data-field="tracking_code"; }
                    }
                    p.pin-feedback data-feedback role="status" {}
                }
            }
        }
        (inline_data("__PIN_DATA__", &pins))
        script src="/js/admin-pins.js" defer {}
    };
    base_document(&head, None, content)
}
